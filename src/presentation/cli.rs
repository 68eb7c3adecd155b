use crate::application::builders::request_builder::{RequestArgs, RequestBuilder};
use crate::domain::value_objects::MultipartCapability;
use crate::infrastructure::config::TransportConfig;
use crate::infrastructure::in_process::InProcessTransport;
use crate::infrastructure::loader::ApplicationLoader;
use crate::infrastructure::output::print_result;
use anyhow::Result;
use clap::Parser;

/// CLI configuration for appcall
#[derive(Parser, Debug)]
#[command(name = "appcall", version)]
#[command(about = "Send requests straight into an in-process web application", long_about = None)]
pub struct Cli {
    /// Registered application source to dispatch into (e.g. `demo`)
    pub source: String,

    #[arg(short = 'P', long, default_value = "/", help = "Request path")]
    pub path: String,

    #[arg(short = 'X', long, default_value = "GET", help = "HTTP method")]
    pub method: String,

    /// JSON request body. Any valid JSON is sent as-is, so `null` sends a
    /// literal `null` body rather than no body.
    #[arg(short = 'd', long = "data")]
    pub data: Option<String>,

    /// Form fields or files (repeatable). Field: 'key=value', file: 'key=@path'.
    /// Files accept ';type=mime' and/or ';filename=name'.
    #[arg(short = 'F', long = "form")]
    pub form: Vec<String>,

    #[arg(short = 'H', long = "header", help = "Additional HTTP headers (Key: Value)")]
    pub headers: Vec<String>,

    #[arg(short = 'q', long = "query", help = "Query parameters (e.g. key=value&foo=bar)")]
    pub query: Vec<String>,

    #[arg(long, help = "Include response headers in output")]
    pub include_headers: bool,

    #[arg(long, help = "Application name (default: app/application/router)")]
    pub app_name: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,
}

impl Cli {
    pub fn request_args(&self) -> RequestArgs {
        RequestArgs {
            method: self.method.clone(),
            path: self.path.clone(),
            headers: self.headers.clone(),
            query: self.query.clone(),
            data: self.data.clone(),
            form: self.form.clone(),
            include_headers: self.include_headers,
        }
    }

    pub async fn run(&self, loader: &dyn ApplicationLoader) -> Result<()> {
        let config = RequestBuilder::assemble(&self.request_args(), MultipartCapability::detect())?;

        let application = loader.load(&self.source, self.app_name.as_deref())?;
        let dispatcher = InProcessTransport::new(application, TransportConfig::default())?
            .create_dispatch_service();

        tracing::info!(source = %self.source, method = %config.method(), path = %config.path(), "sending request");
        let result = dispatcher.execute(&config).await?;

        print_result(&result)
    }
}
