use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hqlgen::ast::format_hql;
use hqlgen::config::EngineConfig;
use hqlgen::db::{
    describe_field, EntityDictionary, InMemoryDictionary, Instance, RecordedQuery,
    RecordingSession, SchemaFile,
};
use hqlgen::filter::{FilterDocument, FilterExpression, TypeName, Value};
use hqlgen::hql::{
    CollectionFetch, QueryBuilder, Relationship, RootCollectionFetchBuilder,
    SubCollectionFetchBuilder, SubCollectionPageTotalsBuilder,
};
use hqlgen::request::{Pagination, Sorting};

/// Generate parameterized HQL from filter, sort and pagination input
#[derive(Parser)]
#[command(name = "hqlgen", version, about)]
struct Cli {
    /// Entity schema (TOML)
    #[arg(long)]
    schema: PathBuf,

    /// Engine config (TOML); defaults to the user config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the statement one clause per line
    #[arg(long)]
    pretty: bool,

    /// Print the recorded query as JSON
    #[arg(long, conflicts_with = "pretty")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a root collection
    Root {
        /// Entity type, e.g. example.Book
        #[arg(long = "type")]
        entity: String,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// Fetch a loaded sub-collection, e.g. one author's books
    Collection {
        #[command(flatten)]
        relationship: RelationshipArgs,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// Count the members of a sub-collection
    Count {
        #[command(flatten)]
        relationship: RelationshipArgs,

        /// Filter document (JSON), paths relative to the child type
        #[arg(long)]
        filter: Option<String>,
    },
    /// List the entities and fields in the schema
    Schema,
}

#[derive(Args)]
struct RelationshipArgs {
    /// Owning entity type, e.g. example.Author
    #[arg(long)]
    parent: String,

    /// Identifier of the owning instance
    #[arg(long)]
    id: String,

    /// Relationship field on the parent, e.g. books
    #[arg(long)]
    relationship: String,
}

#[derive(Args)]
struct RequestArgs {
    /// Filter document (JSON), paths relative to the queried type
    #[arg(long)]
    filter: Option<String>,

    /// Sort spec, e.g. "-publishDate,title"
    #[arg(long)]
    sort: Option<String>,

    #[arg(long)]
    offset: Option<usize>,

    #[arg(long)]
    limit: Option<usize>,

    /// 1-based page number; uses --limit as the page size
    #[arg(long, conflicts_with = "offset")]
    page: Option<usize>,
}

impl RequestArgs {
    fn sorting(&self) -> Result<Option<Sorting>> {
        self.sort
            .as_deref()
            .map(Sorting::parse)
            .transpose()
            .context("Invalid --sort")
    }

    fn pagination(&self, config: &EngineConfig) -> Result<Option<Pagination>> {
        let pagination = match (self.page, self.offset, self.limit) {
            (Some(page), _, size) => Some(Pagination::from_page(page, size, config)?),
            (None, None, None) => None,
            (None, offset, limit) => Some(Pagination::from_request(offset, limit, config)?),
        };
        Ok(pagination)
    }
}

fn parse_filter(
    text: Option<&str>,
    root: &TypeName,
    dictionary: &InMemoryDictionary,
) -> Result<Option<FilterExpression>> {
    let Some(text) = text else {
        return Ok(None);
    };
    let document = FilterDocument::from_json(text).context("Invalid --filter")?;
    let expression = document
        .resolve(root, dictionary)
        .with_context(|| format!("Filter does not apply to {}", root))?;
    Ok(Some(expression))
}

fn load_relationship(
    args: &RelationshipArgs,
    dictionary: &InMemoryDictionary,
) -> Result<Relationship> {
    let parent = TypeName::from(args.parent.as_str());
    let child = dictionary
        .field_type(&parent, &args.relationship)
        .with_context(|| format!("Unknown relationship {}.{}", parent, args.relationship))?;
    let id_field = dictionary.id_field_name(&parent)?;
    let instance = Instance::new(parent.clone()).with(&id_field, Value::from(args.id.as_str()));

    Ok(Relationship::new(
        parent,
        child,
        &args.relationship,
        instance,
        Vec::new(),
    ))
}

fn main() -> Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = EngineConfig::load(cli.config.as_deref())?;
    let dictionary = SchemaFile::load(&cli.schema)?
        .into_dictionary()
        .with_context(|| format!("Invalid schema: {}", cli.schema.display()))?;
    let session = RecordingSession::new();

    match cli.command {
        Command::Root { entity, request } => {
            let root = TypeName::from(entity.as_str());
            let builder = RootCollectionFetchBuilder::new(root.clone(), &dictionary, &session)
                .with_config(&config)
                .with_filter(parse_filter(request.filter.as_deref(), &root, &dictionary)?)
                .with_sort(request.sorting()?)?
                .with_pagination(request.pagination(&config)?)?;

            let query = builder.build()?;
            let pretty = if cli.pretty {
                Some(format_hql(&builder.statement()?.0))
            } else {
                None
            };
            print_query(&query, pretty, cli.json)?;
        }
        Command::Collection {
            relationship: args,
            request,
        } => {
            let relationship = load_relationship(&args, &dictionary)?;
            let builder = SubCollectionFetchBuilder::new(&relationship, &dictionary, &session)
                .with_config(&config)
                .with_filter(parse_filter(
                    request.filter.as_deref(),
                    &relationship.child_type,
                    &dictionary,
                )?)
                .with_sort(request.sorting()?)?
                .with_pagination(request.pagination(&config)?)?;

            match builder.build()? {
                CollectionFetch::UseLoaded => {
                    println!("No query needed: use the loaded collection as-is.");
                }
                CollectionFetch::Query(query) => {
                    let pretty = if cli.pretty {
                        Some(format_hql(&builder.statement()?.0))
                    } else {
                        None
                    };
                    print_query(&query, pretty, cli.json)?;
                }
            }
        }
        Command::Count {
            relationship: args,
            filter,
        } => {
            let relationship = load_relationship(&args, &dictionary)?;
            let builder = SubCollectionPageTotalsBuilder::new(&relationship, &dictionary, &session)
                .with_config(&config)
                .with_filter(parse_filter(
                    filter.as_deref(),
                    &relationship.child_type,
                    &dictionary,
                )?);

            let query = builder.build()?;
            let pretty = if cli.pretty {
                Some(format_hql(&builder.statement()?.0))
            } else {
                None
            };
            print_query(&query, pretty, cli.json)?;
        }
        Command::Schema => print_schema(&dictionary)?,
    }

    Ok(())
}

fn print_query(query: &RecordedQuery, pretty: Option<String>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(query)?);
        return Ok(());
    }

    match pretty {
        Some(text) => println!("{}", text),
        None => println!("{}", query.text()),
    }

    if !query.parameters.is_empty() {
        println!();
        println!("Parameters:");
        for name in query.parameter_names() {
            if let Some(value) = query.parameter(name) {
                println!("  :{} = {}", name, serde_json::to_string(value)?);
            }
        }
    }
    if let Some(offset) = query.first_result {
        println!("Offset: {}", offset);
    }
    if let Some(limit) = query.max_results {
        println!("Limit: {}", limit);
    }
    Ok(())
}

fn print_schema(dictionary: &InMemoryDictionary) -> Result<()> {
    for name in dictionary.entity_names() {
        let binding = dictionary.binding(name)?;
        println!("{} (id: {})", name, binding.id_field);
        for (field, kind) in &binding.fields {
            println!("  {}", describe_field(field, kind));
        }
    }
    Ok(())
}
