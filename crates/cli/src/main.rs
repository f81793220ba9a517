use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{Corpus, MovieId};
use features::FeatureConfig;
use serde::Serialize;
use server::{
    MovieService, MovieSummary, RecommendationResponse, DEFAULT_RECOMMENDATIONS,
    DEFAULT_SEARCH_LIMIT, DEFAULT_TOP_LIMIT,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// movie-recs - content-based movie recommendations
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(about = "Find similar movies by overview and genre (TF-IDF + cosine similarity)", long_about = None)]
struct Cli {
    /// Path to the JSON movie corpus
    #[arg(short, long, env = "MOVIE_RECS_DATA", default_value = "data/movies.json")]
    data: PathBuf,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Minimum number of movies a term must appear in
    #[arg(long, default_value = "1")]
    min_df: usize,

    /// Shortest term length kept in the vocabulary
    #[arg(long, default_value = "2")]
    min_term_len: usize,

    /// Keep common English words in the vocabulary
    #[arg(long)]
    keep_stop_words: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Movies most similar to a title
    Recommend {
        /// Exact movie title
        title: String,

        /// Number of recommendations to return
        #[arg(short = 'n', long, default_value_t = DEFAULT_RECOMMENDATIONS)]
        limit: usize,

        /// Show the shared terms behind each score
        #[arg(long)]
        explain: bool,
    },

    /// Search titles (case-insensitive substring)
    Search {
        query: String,

        #[arg(short = 'n', long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },

    /// List all genres
    Genres,

    /// Highest rated movies
    Trending {
        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_LIMIT)]
        limit: usize,
    },

    /// Highest rated movies in one genre
    Genre {
        /// Genre label, e.g. "Science Fiction"
        name: String,

        #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_LIMIT)]
        limit: usize,
    },

    /// Show one movie by id
    Movie { id: MovieId },

    /// Fire concurrent recommendation queries and report latencies
    Bench {
        /// Number of requests to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of requests in flight at once
        #[arg(long, default_value = "16")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load corpus and build the model before serving any command
    let start = Instant::now();
    let corpus = Corpus::load_from_file(&cli.data)
        .with_context(|| format!("Failed to load movie corpus from {}", cli.data.display()))?;
    let config = FeatureConfig::default()
        .with_min_df(cli.min_df)
        .with_min_term_len(cli.min_term_len)
        .with_stop_words(!cli.keep_stop_words);
    let service = Arc::new(
        MovieService::with_feature_config(Arc::new(corpus), config)
            .context("Failed to build recommendation model")?,
    );
    info!("Model ready in {:?}", start.elapsed());

    let json = cli.json;
    match cli.command {
        Commands::Recommend {
            title,
            limit,
            explain,
        } => handle_recommend(&service, &title, limit, explain, json)?,
        Commands::Search { query, limit } => {
            let matches = service.search(&query, limit);
            output(&matches, json, |m| {
                print_movies(&format!("Search results for '{}':", query), m)
            })?
        }
        Commands::Genres => output(service.genres(), json, |genres| {
            println!("{}", "Genres:".bold().blue());
            for genre in genres {
                println!("  {} {}", "•".green(), genre);
            }
        })?,
        Commands::Trending { limit } => {
            let movies = service.trending(limit);
            output(&movies, json, |m| print_movies("Trending:", m))?
        }
        Commands::Genre { name, limit } => {
            let movies = service.by_genre(&name, limit);
            output(&movies, json, |m| print_movies(&format!("Top {}:", name), m))?
        }
        Commands::Movie { id } => {
            let movie = service.movie(id)?;
            output(&movie, json, print_movie_detail)?
        }
        Commands::Bench {
            requests,
            concurrent,
        } => handle_bench(service, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    service: &MovieService,
    title: &str,
    limit: usize,
    explain: bool,
    json: bool,
) -> Result<()> {
    match service.recommend(title, limit) {
        Ok(response) => output(&response, json, |r| print_recommendations(r, explain)),
        Err(err) if err.is_not_found() => {
            // Offer close titles before failing
            let suggestions = service.search(title, 5);
            if !json && !suggestions.is_empty() {
                println!("{}", "Did you mean:".yellow());
                for movie in &suggestions {
                    println!("  - {}", movie.title);
                }
            }
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

/// Handle the 'bench' command
async fn handle_bench(service: Arc<MovieService>, requests: usize, concurrent: usize) -> Result<()> {
    let n = service.corpus().len();
    let titles: Vec<String> = (0..requests)
        .map(|_| {
            let pos = rand::random::<u64>() as usize % n;
            service.corpus().movies()[pos].title.clone()
        })
        .collect();

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for title in titles {
        let service = Arc::clone(&service);
        let permit = Arc::clone(&permits).acquire_owned().await?;
        handles.push(tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let result = service.recommend(&title, DEFAULT_RECOMMENDATIONS);
            drop(permit);
            result.map(|_| start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(handles.len());
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall = wall.elapsed();

    if timings.is_empty() {
        println!("No requests made");
        return Ok(());
    }

    timings.sort();
    let total: Duration = timings.iter().sum();
    let percentile = |p: f64| timings[((timings.len() - 1) as f64 * p) as usize];

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", timings.len(), concurrent);
    println!("Wall time: {:?}", wall);
    println!("Average latency: {:?}", total / timings.len() as u32);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        timings.len() as f64 / wall.as_secs_f64()
    );
    Ok(())
}

/// Print as pretty JSON, or hand the value to a text printer
fn output<T: Serialize + ?Sized>(value: &T, json: bool, print: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print(value);
    }
    Ok(())
}

fn print_recommendations(response: &RecommendationResponse, explain: bool) {
    println!(
        "{}",
        format!("Movies similar to '{}':", response.movie).bold().blue()
    );
    if response.recommendations.is_empty() {
        println!("  (no other movies in the corpus)");
    }
    for (rank, rec) in response.recommendations.iter().enumerate() {
        println!(
            "{}. {} ({}) [{}] - Similarity: {:.3}",
            (rank + 1).to_string().green(),
            rec.movie.title,
            display_year(&rec.movie.year),
            rec.movie.genres.join(", "),
            rec.similarity
        );
        if explain {
            if rec.shared_terms.is_empty() {
                println!("   No shared terms");
            } else {
                println!("   Shared terms: {}", rec.shared_terms.join(", "));
            }
        }
    }
}

fn print_movies(header: &str, movies: &[MovieSummary]) {
    println!("{}", header.bold().blue());
    if movies.is_empty() {
        println!("  (none)");
    }
    for movie in movies {
        println!(
            "{}: {} ({}) [{}] rating {:.1}",
            movie.id,
            movie.title,
            display_year(&movie.year),
            movie.genres.join(", "),
            movie.rating
        );
    }
}

fn print_movie_detail(movie: &MovieSummary) {
    println!("{}", format!("{} ({})", movie.title, display_year(&movie.year)).bold().blue());
    println!("{}Id: {}", "• ".green(), movie.id);
    println!("{}Rating: {:.1}", "• ".green(), movie.rating);
    println!("{}Genres: {}", "• ".green(), movie.genres.join(", "));
    if !movie.overview.is_empty() {
        println!("\n{}", movie.overview);
    }
}

fn display_year(year: &str) -> &str {
    if year.is_empty() { "????" } else { year }
}
