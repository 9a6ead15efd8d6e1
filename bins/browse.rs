//! Terminal client for a running marketplace server.
//!
//! Browses listings through the same store, pagination and session types the
//! web client uses, against the server's JSON API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use service::auth::domain::SignInInput;
use service::auth::repo::http::HttpAuthProvider;
use service::auth::SessionStore;
use service::filters;
use service::listing::repo::http::HttpListingRepository;
use service::listing::service::DEFAULT_FETCH_TIMEOUT;
use service::listing::view::ListingDetail;
use service::listing::{ListingStore, ServiceListing};
use service::notify::TracingNotifier;
use service::pagination::{PageView, Paginator};
use service::rating::format_rating;

const PAGE_SIZE: u32 = 9;

#[derive(Parser)]
#[command(name = "browse")]
#[command(author, version, about = "Browse marketplace services from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the marketplace API
    #[arg(long, global = true, env = "CHOWK_API_URL", default_value = "http://127.0.0.1:8080")]
    api_url: String,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search all services, e.g. `browse services "query=logo&city=london" 2`
    #[command(alias = "ls")]
    Services {
        /// Filter query string (`query`, `category`, `city`)
        #[arg(default_value = "")]
        filters: String,
        #[arg(default_value_t = 1)]
        page: u32,
    },
    /// Services in one category
    Category {
        name: String,
        #[arg(default_value = "")]
        filters: String,
        #[arg(default_value_t = 1)]
        page: u32,
    },
    /// One service in detail
    Show { id: Uuid },
    /// Your own services
    Dashboard {
        #[arg(long, env = "CHOWK_EMAIL")]
        email: String,
        #[arg(long, env = "CHOWK_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

type Store = ListingStore<HttpListingRepository, TracingNotifier>;

fn print_listing(l: &ServiceListing) {
    println!("{}  {}", l.id, l.title);
    println!("    {} · {} · {}", l.category_label(), l.city_label(), format_rating(l.average_rating));
}

async fn search(store: &Store, filter_string: &str, category: Option<&str>, page: u32, json: bool) -> anyhow::Result<()> {
    let mut filters = filters::decode(filter_string);
    if let Some(c) = category {
        filters = filters.with_category(c);
    }
    store.fetch_page(page, PAGE_SIZE, &filters).await?;
    let state = store.snapshot();

    let mut paginator = Paginator::new(PAGE_SIZE);
    paginator.set_total(state.total);
    paginator.go_to(page);

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "items": state.items,
            "total": state.total,
            "filters": filters::encode(&filters),
            "view": paginator.view(),
        }))?);
        return Ok(());
    }
    match paginator.view() {
        PageView::Empty => {
            if filters.is_filtered() {
                println!("No services match these filters.");
            } else {
                println!("No services yet.");
            }
        }
        PageView::Page { current, page_count, show_controls } => {
            for l in &state.items {
                print_listing(l);
            }
            if show_controls {
                println!("-- page {current} of {page_count} ({} services) --", state.total);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_cli();
    let cli = Cli::parse();

    let timeout = cli.timeout.map(Duration::from_secs).unwrap_or(DEFAULT_FETCH_TIMEOUT);
    let repo = Arc::new(HttpListingRepository::new(&cli.api_url)?);
    let notifier = Arc::new(TracingNotifier);
    let store: Store = ListingStore::new(repo.clone(), notifier.clone(), timeout);

    match cli.command {
        Commands::Services { filters, page } => search(&store, &filters, None, page, cli.json).await?,
        Commands::Category { name, filters, page } => search(&store, &filters, Some(&name), page, cli.json).await?,
        Commands::Show { id } => {
            let detail = ListingDetail::new(store.get_listing(id).await?, None);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print_listing(&detail.listing);
                println!();
                println!("{}", detail.listing.description);
                println!();
                println!("Contact: {}", detail.listing.contact_email);
                if let Some(phone) = &detail.listing.contact_phone {
                    println!("Phone:   {phone}");
                }
            }
        }
        Commands::Dashboard { email, password } => {
            let sessions = SessionStore::new(Arc::new(HttpAuthProvider::new(&cli.api_url)?), notifier);
            sessions.sign_in(SignInInput { email, password }).await?;
            repo.set_token(sessions.token());
            let owner = sessions.user_id().context("signed in without a session")?;
            let items = store.owner_listings(owner).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("You have no services yet.");
            } else {
                for l in &items {
                    print_listing(l);
                }
            }
            sessions.sign_out().await?;
        }
    }
    Ok(())
}
