use clap::{Args, Subcommand};

// --- IMPORTS DOCSTORE ---

use docstore::catalog::Catalog;
use docstore::client::{DbClient, LocalBackend, QueryOptions};
use docstore::json_db::ids;
use docstore::json_db::migrations::{copy_collection, flatten_all, flatten_collection};
use docstore::json_db::storage::{JsonDbConfig, StorageEngine};
use docstore::{
    user_info, user_success,
    utils::{
        fs::{self, Path, PathBuf},
        json,
        prelude::*,
    },
};

// --- DÉFINITION DES ARGUMENTS ---

#[derive(Args, Debug, Clone)]
pub struct JsondbArgs {
    /// Dossier des fichiers de collection
    #[arg(long, global = true, env = "DOCSTORE_DATA_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: JsondbCommands,
}

/// Les arguments JSON acceptent une chaîne inline ou `@chemin/fichier.json`.
#[derive(Subcommand, Debug, Clone)]
pub enum JsondbCommands {
    // --- LECTURE ---
    /// findMany : options `{ where, select, include, orderBy, skip, take }`
    Find {
        #[arg(long)]
        collection: String,
        #[arg(long)]
        options: Option<String>,
    },
    /// findUnique : options `{ where, select, include }`
    FindUnique {
        #[arg(long)]
        collection: String,
        #[arg(long)]
        options: String,
    },
    Count {
        #[arg(long)]
        collection: String,
        #[arg(long)]
        options: Option<String>,
    },

    // --- ÉCRITURE ---
    Create {
        #[arg(long)]
        collection: String,
        #[arg(long)]
        data: String,
    },
    /// Mise à jour partielle du premier document correspondant
    Update {
        #[arg(long)]
        collection: String,
        #[arg(long = "where")]
        filter: String,
        #[arg(long)]
        data: String,
    },
    Delete {
        #[arg(long)]
        collection: String,
        #[arg(long = "where")]
        filter: String,
    },

    // --- MAINTENANCE ---
    ListCollections,
    /// Réécrit les enveloppes héritées au format plat (toutes les collections par défaut)
    Normalize {
        #[arg(long)]
        collection: Option<String>,
    },
    /// Copie vers un autre dossier, en ignorant les clés naturelles déjà présentes
    Copy {
        #[arg(long)]
        to: PathBuf,
        #[arg(long)]
        collection: Option<String>,
    },
    /// Affiche un identifiant interne neuf
    NewId {
        /// Génère plutôt une clé naturelle libre pour `collection.field`
        #[arg(long, requires = "field")]
        collection: Option<String>,
        #[arg(long)]
        field: Option<String>,
    },
}

// --- HANDLER PRINCIPAL ---

pub async fn handle(args: JsondbArgs) -> Result<()> {
    let root_dir = resolve_root(args.root);
    let catalog = Catalog::standard();
    let config = JsonDbConfig::new(root_dir.clone()).with_envelope_keys(catalog.envelope_keys());
    let storage = StorageEngine::new(config.clone());
    let db = DbClient::local(config, &catalog);

    debug!(root = ?root_dir, "docstore-cli");

    match args.command {
        JsondbCommands::Find {
            collection,
            options,
        } => {
            let docs = db
                .collection(&collection)
                .find_many(parse_options(options.as_deref()).await?)
                .await?;
            println!("{}", json::stringify_pretty(&docs)?);
        }
        JsondbCommands::FindUnique {
            collection,
            options,
        } => {
            let doc = db
                .collection(&collection)
                .find_unique(parse_options(Some(&options)).await?)
                .await?;
            match doc {
                Some(d) => println!("{}", json::stringify_pretty(&d)?),
                None => user_info!("FIND_UNIQUE_NONE", "{}", collection),
            }
        }
        JsondbCommands::Count {
            collection,
            options,
        } => {
            let n = db
                .collection(&collection)
                .count(parse_options(options.as_deref()).await?)
                .await?;
            println!("{}", n);
        }
        JsondbCommands::Create { collection, data } => {
            let options = QueryOptions::new().data(parse_data(&data).await?);
            let doc = db.collection(&collection).create(options).await?;
            user_success!("CREATE_SUCCESS", "{}", doc.id().unwrap_or("?"));
        }
        JsondbCommands::Update {
            collection,
            filter,
            data,
        } => {
            let options = QueryOptions::new()
                .filter(parse_data(&filter).await?)
                .data(parse_data(&data).await?);
            let doc = db.collection(&collection).update(options).await?;
            user_success!("UPDATE_SUCCESS", "{}", doc.id().unwrap_or("?"));
        }
        JsondbCommands::Delete { collection, filter } => {
            let options = QueryOptions::new().filter(parse_data(&filter).await?);
            let doc = db.collection(&collection).delete(options).await?;
            user_success!("DELETE_SUCCESS", "{}", doc.id().unwrap_or("?"));
        }
        JsondbCommands::ListCollections => {
            let cols = storage.list_collections().await?;
            println!("{}", json::stringify_pretty(&cols)?);
        }
        JsondbCommands::Normalize { collection } => match collection {
            Some(name) => {
                let n = flatten_collection(&storage, &name).await?;
                user_success!("NORMALIZE_SUCCESS", "{} : {} document(s)", name, n);
            }
            None => {
                for (name, n) in flatten_all(&storage).await? {
                    user_success!("NORMALIZE_SUCCESS", "{} : {} document(s)", name, n);
                }
            }
        },
        JsondbCommands::Copy { to, collection } => {
            let src = LocalBackend::new(JsonDbConfig::new(root_dir.clone()), &catalog);
            let dst = LocalBackend::new(JsonDbConfig::new(to.clone()), &catalog);
            let targets = match collection {
                Some(name) => vec![name],
                None => storage.list_collections().await?,
            };
            for name in targets {
                let stats = copy_collection(&src, &dst, &name, catalog.natural_key(&name)).await?;
                user_success!(
                    "COPY_SUCCESS",
                    "{} -> {:?} : {} copié(s), {} ignoré(s)",
                    name,
                    to,
                    stats.copied,
                    stats.skipped
                );
            }
        }
        JsondbCommands::NewId { collection, field } => match (collection, field) {
            (Some(collection), Some(field)) => {
                let key = db
                    .collection(&collection)
                    .generate_key(&field, &ids::KeyPolicy::default())
                    .await?;
                println!("{}", key);
            }
            _ => println!("{}", ids::new_id()),
        },
    }
    Ok(())
}

// --- HELPERS ---

fn resolve_root(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| match AppConfig::get() {
        Ok(cfg) => cfg.data_root.clone(),
        Err(_) => AppConfig::default().data_root,
    })
}

async fn parse_data(input: &str) -> Result<Value> {
    if let Some(path_str) = input.strip_prefix('@') {
        let path = Path::new(path_str);
        let content = fs::read_optional(path)
            .await?
            .ok_or_else(|| AppError::invalid(format!("Fichier introuvable : {}", path_str)))?;
        json::parse(&content)
    } else {
        json::parse(input)
    }
}

async fn parse_options(input: Option<&str>) -> Result<QueryOptions> {
    match input {
        Some(raw) => QueryOptions::from_value(parse_data(raw).await?),
        None => Ok(QueryOptions::new()),
    }
}
