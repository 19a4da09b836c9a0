use clap::{Parser, Subcommand};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "greeting-cli")]
#[command(about = "Cross-origin client for the greeting service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Origin presented to the service.
    #[arg(short, long, default_value = "http://localhost:9000")]
    origin: String,

    /// Route to call.
    #[arg(short, long, default_value = "/greeting")]
    route: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a greeting
    Greet {
        #[arg(short, long)]
        name: Option<String>,
        /// Send the name as a form body instead of a query parameter
        #[arg(long)]
        post: bool,
    },
    /// Send a CORS preflight and show the grant
    Preflight {
        #[arg(short, long, default_value = "GET")]
        method: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let endpoint = format!("{}{}", cli.url.trim_end_matches('/'), cli.route);

    let mut headers = HeaderMap::new();
    headers.insert(ORIGIN, HeaderValue::from_str(&cli.origin)?);

    match cli.command {
        Commands::Greet { name, post } => {
            let request = match (post, name) {
                (true, Some(name)) => client.post(&endpoint).form(&[("name", name)]),
                (true, None) => client.post(&endpoint),
                (false, Some(name)) => client.get(&endpoint).query(&[("name", name)]),
                (false, None) => client.get(&endpoint),
            };
            let res = request.headers(headers).send().await?;
            print_grant(res.headers());
            print_response(res).await?;
        }
        Commands::Preflight { method } => {
            headers.insert(ACCESS_CONTROL_REQUEST_METHOD, HeaderValue::from_str(&method)?);
            let res = client
                .request(reqwest::Method::OPTIONS, &endpoint)
                .headers(headers)
                .send()
                .await?;
            println!("Status: {}", res.status());
            print_grant(res.headers());
            for (label, name) in [
                ("Allowed methods", ACCESS_CONTROL_ALLOW_METHODS),
                ("Max age", ACCESS_CONTROL_MAX_AGE),
            ] {
                if let Some(value) = res.headers().get(name) {
                    println!("{}: {}", label, value.to_str().unwrap_or("<binary>"));
                }
            }
        }
    }

    Ok(())
}

fn print_grant(headers: &HeaderMap) {
    match headers.get(ACCESS_CONTROL_ALLOW_ORIGIN) {
        Some(value) => println!("Allowed origin: {}", value.to_str().unwrap_or("<binary>")),
        None => println!("Allowed origin: <none>"),
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }
    if text.is_empty() {
        println!("(empty body)");
        return Ok(());
    }

    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
