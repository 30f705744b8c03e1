use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "product-cli")]
#[command(about = "Command-line client for the product API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9090")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all products
    List,
    /// Create a product
    Create(ProductArgs),
    /// Replace the fields of an existing product
    Update {
        id: u64,
        #[command(flatten)]
        product: ProductArgs,
    },
}

#[derive(Args)]
struct ProductArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    price: f64,
    #[arg(long)]
    sku: String,
    #[arg(long, default_value = "")]
    description: String,
}

impl ProductArgs {
    fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "price": self.price,
            "sku": self.sku,
        })
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::List => client.get(format!("{}/", base)).send().await?,
        Commands::Create(product) => {
            client
                .post(format!("{}/", base))
                .json(&product.to_json())
                .send()
                .await?
        }
        Commands::Update { id, product } => {
            client
                .put(format!("{}/{}", base, id))
                .json(&product.to_json())
                .send()
                .await?
        }
    };

    let status = res.status();
    let text = res.text().await?;
    match render(status, &text) {
        Ok(output) => {
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(message) => {
            eprintln!("{}", message);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Stdout text for a successful response, stderr text otherwise.
fn render(status: StatusCode, text: &str) -> Result<String, String> {
    if !status.is_success() {
        let mut message = format!("Error: product API returned status {}", status);
        if !text.is_empty() {
            message.push_str(&format!("\nResponse: {}", text.trim_end()));
        }
        return Err(message);
    }

    if text.is_empty() {
        return Ok(status.to_string());
    }

    let json: Value = serde_json::from_str(text)
        .map_err(|e| format!("Error: unreadable response body: {}", e))?;
    serde_json::to_string_pretty(&json).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_is_a_failure() {
        let err = render(StatusCode::NOT_FOUND, "Product not found\n").unwrap_err();
        assert!(err.contains("404"));
        assert!(err.ends_with("Response: Product not found"));

        assert!(render(StatusCode::METHOD_NOT_ALLOWED, "").is_err());
    }

    #[test]
    fn success_is_pretty_printed() {
        let out = render(StatusCode::OK, r#"{"id":3,"name":"Tea"}"#).unwrap();
        assert!(out.contains("\"id\": 3"));

        assert_eq!(render(StatusCode::NO_CONTENT, "").unwrap(), "204 No Content");
    }

    #[test]
    fn garbage_body_is_a_failure() {
        assert!(render(StatusCode::OK, "<html>").is_err());
    }
}
