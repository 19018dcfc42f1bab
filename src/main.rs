use clap::Parser;
use docshelf::{
    Category,
    DataDir,
    DocumentId,
    DocumentPatch,
    NewDocument,
    Repository,
    Settings,
    cli::{self, Cli, Command, ConfigAction},
    context,
    error::{self, Error},
    ingestion,
    search,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DOCSHELF_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let repo = Repository::open(&data_dir.documents_db())?;

    match cli.command {
        Command::Import(args) => cmd_import(&repo, &args)?,
        Command::Add(args) => cmd_add(&repo, &args)?,
        Command::List(args) => cmd_list(&repo, &args)?,
        Command::Get(args) => cmd_get(&repo, &args)?,
        Command::Update(args) => cmd_update(&repo, &args)?,
        Command::Delete { id } => {
            let doc = repo.delete(id.parse()?)?;
            println!("Deleted {} {}", doc.id, doc.title);
        }
        Command::Search(args) => {
            let settings = repo.settings()?;
            let (threshold, results) =
                search::execute_search(&args, &repo, &settings)?;
            if args.json {
                search::format_json(&results, &args.query, threshold)?;
            } else {
                search::format_human(&results);
            }
        }
        Command::Context(args) => {
            let settings = repo.settings()?;
            let threshold =
                search::resolve_threshold(args.threshold, &settings)?;
            let hits = repo.search(&args.query, threshold)?;
            println!(
                "{}",
                context::build_context(hits.iter().map(|h| &h.document))
            );
        }
        Command::Status(args) => cmd_status(&repo, &data_dir, args.json)?,
        Command::Config { action } => cmd_config(&repo, &action)?,
        Command::Completions(_) => {}
    }

    Ok(())
}

fn parse_category(raw: Option<&str>) -> error::Result<Option<Category>> {
    raw.map(str::parse).transpose()
}

fn cmd_import(repo: &Repository, args: &cli::ImportArgs) -> error::Result<()> {
    let report = ingestion::ingest_paths(repo, &args.paths)?;

    if args.json {
        let failed: Vec<_> = report
            .failed
            .iter()
            .map(|f| json!({ "name": f.name, "error": f.error.to_string() }))
            .collect();
        println!(
            "{}",
            json!({ "created": report.created, "failed": failed })
        );
    } else {
        for doc in &report.created {
            println!("Imported {} {} ({})", doc.id, doc.title, doc.category);
        }
        for failure in &report.failed {
            eprintln!("Failed {}: {}", failure.name, failure.error);
        }
        println!(
            "\n{} imported, {} failed",
            report.created.len(),
            report.failed.len()
        );
    }

    if report.created.is_empty() && !report.failed.is_empty() {
        return Err(Error::Validation(format!(
            "none of the {} input(s) could be imported",
            report.total()
        )));
    }
    Ok(())
}

fn cmd_add(repo: &Repository, args: &cli::AddArgs) -> error::Result<()> {
    let category = match parse_category(args.category.as_deref())? {
        Some(category) => category,
        None => repo.classify(&args.content),
    };
    let doc = repo.create(NewDocument {
        title: args.title.clone(),
        category,
        content: args.content.clone(),
    })?;
    println!("Added {} {} ({})", doc.id, doc.title, doc.category);
    Ok(())
}

fn cmd_list(repo: &Repository, args: &cli::ListArgs) -> error::Result<()> {
    let docs = match parse_category(args.category.as_deref())? {
        Some(category) => repo.list_by_category(category)?,
        None => repo.list()?,
    };

    if args.json {
        println!("{}", serde_json::to_string(&docs)?);
    } else if docs.is_empty() {
        println!("No documents stored.");
    } else {
        for doc in &docs {
            println!("{}\t{}\t{}", doc.id, doc.category, doc.title);
        }
    }
    Ok(())
}

fn cmd_get(repo: &Repository, args: &cli::GetArgs) -> error::Result<()> {
    let id: DocumentId = args.id.parse()?;
    let doc = repo.get(id)?;

    if args.meta {
        println!("id: {}", doc.id);
        println!("title: {}", doc.title);
        println!("category: {}", doc.category);
        println!("created_at: {}", doc.created_at);
    } else if args.json {
        println!("{}", serde_json::to_string(&doc)?);
    } else {
        print!("{}", doc.content);
        if !doc.content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

fn cmd_update(repo: &Repository, args: &cli::UpdateArgs) -> error::Result<()> {
    let id: DocumentId = args.id.parse()?;
    let content = args
        .content_file
        .as_deref()
        .map(std::fs::read_to_string)
        .transpose()?;
    let patch = DocumentPatch {
        title: args.title.clone(),
        content,
        category: parse_category(args.category.as_deref())?,
    };
    if patch.is_empty() {
        return Err(Error::Validation(
            "nothing to update: pass --title, --content-file or --category"
                .into(),
        ));
    }

    let doc = repo.update(id, patch)?;
    println!("Updated {} {} ({})", doc.id, doc.title, doc.category);
    Ok(())
}

fn cmd_status(
    repo: &Repository,
    data_dir: &DataDir,
    json: bool,
) -> error::Result<()> {
    let total = repo.count()?;
    let by_category = repo.count_by_category()?;

    if json {
        let categories: serde_json::Map<_, _> = by_category
            .iter()
            .map(|(c, n)| (c.to_string(), json!(n)))
            .collect();
        println!(
            "{}",
            json!({
                "dataDir": data_dir.root(),
                "dataDirSource": data_dir.origin().to_string(),
                "documents": total,
                "categories": categories,
            })
        );
    } else {
        println!(
            "Data directory: {} (from {})",
            data_dir.root().display(),
            data_dir.origin()
        );
        println!("Documents: {total}");
        for (category, count) in &by_category {
            println!("  {category}: {count}");
        }
    }
    Ok(())
}

fn cmd_config(repo: &Repository, action: &ConfigAction) -> error::Result<()> {
    match action {
        ConfigAction::Show => {
            for (key, value) in repo.settings()?.entries() {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Set { key, value } => {
            Settings::set(repo.store(), key, value)?;
            println!("Set {key} = {value}");
        }
        ConfigAction::Clear { key } => {
            if Settings::clear(repo.store(), key)? {
                println!("Cleared {key}");
            } else {
                println!("{key} was not set");
            }
        }
    }
    Ok(())
}
