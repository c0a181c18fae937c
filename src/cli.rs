//! # RBACCTL CLI
//!
//! Command-line interface for inspecting Kubernetes RBAC the way the console
//! shows it.
//!
//! ## Usage
//!
//! ```bash
//! # List API groups with their resources and verbs
//! rbacctl api-resources --include-core
//!
//! # List service accounts in a namespace
//! rbacctl service-accounts -n default
//!
//! # Show the roles bound to a service account, grouped by API group
//! rbacctl bindings --name builder -n ci
//! rbacctl bindings --name builder -n ci --cluster
//!
//! # Explain the verbs a rule can grant
//! rbacctl verbs
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use rbac_manager::catalog::{list_resource_types, resources_by_kind};
use rbac_manager::kubernetes::resources;
use rbac_manager::rbac::{
    effective_verbs, group_display_name, group_rules, BoundRole, Verb, CONCRETE_VERBS,
};
use rbac_manager::{resolve_principal_cluster_roles, resolve_principal_roles, KubeClient, KubeConfig};

/// RBAC Manager CLI
#[derive(Parser)]
#[command(name = "rbacctl")]
#[command(about = "Inspect Kubernetes RBAC objects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Kubernetes API server URL
    #[arg(long, global = true, env = "KUBE_API_URL")]
    server: Option<String>,

    /// Bearer token for the API server
    #[arg(long, global = true, env = "TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// List API groups with their resource kinds and verbs
    ApiResources {
        /// Include the core ("") API group
        #[arg(long)]
        include_core: bool,
    },
    /// List service accounts
    ServiceAccounts {
        /// Namespace to list (defaults to all namespaces)
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// List roles of a namespace
    Roles {
        #[arg(short, long)]
        namespace: String,
    },
    /// Show roles bound to a service account
    Bindings {
        /// Service account name
        #[arg(long)]
        name: String,

        /// Service account namespace
        #[arg(short, long)]
        namespace: String,

        /// Resolve ClusterRoleBindings instead of RoleBindings
        #[arg(long)]
        cluster: bool,
    },
    /// Describe the verbs a rule can grant
    Verbs,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rbacctl=warn,rbac_manager=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let _ = rustls::crypto::ring::default_provider().install_default();
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    if matches!(cli.command, Commands::Verbs) {
        print_verbs(cli.output)?;
        return Ok(());
    }
    let client = KubeClient::new(kube_config(&cli)?).context("Failed to create Kubernetes client")?;

    match cli.command {
        Commands::ApiResources { include_core } => {
            let catalog = list_resource_types(&client, include_core)
                .await
                .context("Failed to discover API resources")?;
            if cli.output == OutputFormat::Table {
                println!("{:<40} {:<32} {:<10} VERBS", "APIGROUP", "KIND (RESOURCE)", "NAMESPACED");
                for grouping in &catalog {
                    for resource in resources_by_kind(grouping) {
                        println!(
                            "{:<40} {:<32} {:<10} {}",
                            group_display_name(&grouping.api.name),
                            format!("{} ({})", resource.kind, resource.name),
                            resource.namespaced,
                            resource.verbs.join(",")
                        );
                    }
                }
            } else {
                print_structured(cli.output, &catalog)?;
            }
        }
        Commands::ServiceAccounts { namespace } => {
            let accounts = resources::list_service_accounts(&client, namespace.as_deref())
                .await
                .context("Failed to list service accounts")?;
            if cli.output == OutputFormat::Table {
                if accounts.is_empty() {
                    println!("No service accounts found.");
                    return Ok(());
                }
                println!("{:<30} NAME", "NAMESPACE");
                for account in &accounts {
                    println!(
                        "{:<30} {}",
                        account.metadata.namespace.as_deref().unwrap_or("<unknown>"),
                        account.metadata.name
                    );
                }
            } else {
                print_structured(cli.output, &accounts)?;
            }
        }
        Commands::Roles { namespace } => {
            let roles = resources::list_roles(&client, &namespace)
                .await
                .with_context(|| format!("Failed to list roles in '{namespace}'"))?;
            if cli.output == OutputFormat::Table {
                println!("{:<40} RULES", "NAME");
                for role in &roles {
                    println!("{:<40} {}", role.metadata.name, role.rules.len());
                }
            } else {
                print_structured(cli.output, &roles)?;
            }
        }
        Commands::Bindings {
            name,
            namespace,
            cluster,
        } => {
            let bound = if cluster {
                resolve_principal_cluster_roles(&client, &name, Some(namespace.as_str())).await
            } else {
                resolve_principal_roles(&client, &name, &namespace).await
            }
            .with_context(|| format!("Failed to resolve roles of '{namespace}/{name}'"))?;

            if cli.output == OutputFormat::Table {
                print_bindings(&namespace, &name, &bound);
            } else {
                print_structured(cli.output, &bound)?;
            }
        }
        Commands::Verbs => unreachable!("handled before connecting"),
    }

    Ok(())
}

fn kube_config(cli: &Cli) -> Result<KubeConfig> {
    let config = match (&cli.server, &cli.token) {
        (Some(server), Some(token)) => KubeConfig::new(server.clone(), token.clone()),
        _ => KubeConfig::from_env().context(
            "No API server configured. Pass --server and --token or set KUBE_API_URL and TOKEN.",
        )?,
    };
    Ok(if cli.insecure {
        config.with_skip_tls_verify(true)
    } else {
        config
    })
}

fn join_verbs(verbs: &[Verb]) -> String {
    verbs.iter().map(Verb::as_str).collect::<Vec<_>>().join(",")
}

#[derive(Serialize)]
struct VerbRow {
    verb: String,
    description: &'static str,
}

fn print_verbs(format: OutputFormat) -> Result<()> {
    let rows: Vec<VerbRow> = CONCRETE_VERBS
        .iter()
        .chain(std::iter::once(&Verb::All))
        .map(|verb| VerbRow {
            verb: verb.to_string(),
            description: verb.description().unwrap_or_default(),
        })
        .collect();
    if format == OutputFormat::Table {
        println!("{:<18} DESCRIPTION", "VERB");
        for row in &rows {
            println!("{:<18} {}", row.verb, row.description);
        }
        Ok(())
    } else {
        print_structured(format, &rows)
    }
}

fn print_structured<T: Serialize>(format: OutputFormat, value: &T) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Table => unreachable!("tables are printed by each command"),
    }
    Ok(())
}

fn print_bindings(namespace: &str, name: &str, bound: &[BoundRole]) {
    if bound.is_empty() {
        println!("ServiceAccount '{namespace}/{name}' has no bound roles.");
        return;
    }
    for pair in bound {
        println!(
            "{} -> {} {}",
            pair.role_binding.metadata.name, pair.role_binding.role_ref.kind, pair.role.metadata.name
        );
        for (api_group, entries) in group_rules(&pair.role.rules) {
            println!("  {}:", group_display_name(&api_group));
            for entry in entries {
                println!("    {:<32} {}", entry.name, join_verbs(&effective_verbs(&entry.verbs)));
            }
        }
        for rule in &pair.role.rules {
            let Some(urls) = rule.non_resource_urls.as_ref().filter(|u| !u.is_empty()) else {
                continue;
            };
            let verbs: Vec<Verb> = rule.verbs.iter().map(|v| Verb::from(v.as_str())).collect();
            println!(
                "  nonResourceURLs {}: {}",
                urls.join(","),
                join_verbs(&effective_verbs(&verbs))
            );
        }
    }
}
