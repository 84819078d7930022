use braintree_payment::application::controller::MethodController;
use braintree_payment::domain::form::{FormSubmission, NONCE_FIELD};
use braintree_payment::domain::method::{MethodKind, PaymentMethod};
use braintree_payment::domain::payment::PaymentStatus;
use braintree_payment::domain::ports::PaymentStoreRef;
use braintree_payment::infrastructure::braintree::create_gateway;
use braintree_payment::infrastructure::in_memory::{InMemoryPaymentStore, MapContext};
#[cfg(feature = "storage-rocksdb")]
use braintree_payment::infrastructure::rocksdb::RocksDBPaymentStore;
use braintree_payment::infrastructure::tracing_log::{StderrNotifier, TracingEventLog};
use braintree_payment::interfaces::config_file;
use braintree_payment::interfaces::csv::payment_writer::PaymentWriter;
use braintree_payment::interfaces::json::{read_context, read_payment, write_pretty};
use braintree_payment::observability::{LogFormat, init_observability};
use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result, miette};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Method configuration (TOML). Credentials may also come from the environment.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Payment method instance id
    #[arg(long, global = true, default_value_t = 1)]
    pmid: u64,

    /// Site-specific method title used in log messages
    #[arg(long, global = true)]
    title: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = Kind::CreditCard)]
    kind: Kind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    CreditCard,
    GooglePay,
}

impl From<Kind> for MethodKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::CreditCard => MethodKind::CreditCard,
            Kind::GooglePay => MethodKind::GooglePay,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Request a client token for the browser SDK
    ClientToken,
    /// Render the payment form as JSON
    RenderForm {
        /// Payment document (JSON)
        #[arg(long)]
        payment: PathBuf,
        /// Context values used for prefilling (JSON object)
        #[arg(long)]
        context: Option<PathBuf>,
    },
    /// Validate and execute a payment
    Pay {
        #[arg(long)]
        payment: PathBuf,
        /// Nonce produced by the client-side SDK
        #[arg(long)]
        nonce: String,
        #[arg(long)]
        context: Option<PathBuf>,
        /// Submitted form value, `name=value`
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
    /// List stored payments as CSV
    Payments {
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
}

fn parse_field(value: &str) -> std::result::Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{value}`"))
}

fn open_store(db_path: Option<PathBuf>) -> Result<PaymentStoreRef> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBPaymentStore::open(path).into_diagnostic()?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Arc::new(InMemoryPaymentStore::new()))
        }
        None => Ok(Arc::new(InMemoryPaymentStore::new())),
    }
}

fn load_context(path: Option<&Path>) -> Result<MapContext> {
    match path {
        Some(path) => read_context(File::open(path).into_diagnostic()?).into_diagnostic(),
        None => Ok(MapContext::default()),
    }
}

fn build_controller(cli: &Cli, store: PaymentStoreRef) -> Result<MethodController> {
    let config = config_file::load(cli.config.as_deref()).into_diagnostic()?;
    let gateway = match create_gateway(&config) {
        Ok(gateway) => Some(gateway),
        Err(e) => {
            warn!(error = %e, "Braintree gateway client unavailable");
            None
        }
    };

    let mut method = PaymentMethod::new(cli.pmid, cli.kind.into(), config);
    if let Some(title) = &cli.title {
        method = method.with_title(title.clone());
    }
    Ok(MethodController::new(
        method,
        gateway,
        store,
        Arc::new(TracingEventLog),
        Arc::new(StderrNotifier),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_observability(LogFormat::from_env());
    let cli = Cli::parse();

    match &cli.command {
        Command::ClientToken => {
            let controller = build_controller(&cli, Arc::new(InMemoryPaymentStore::new()))?;
            let token = controller.client_token().await.into_diagnostic()?;
            println!("{}", token.as_str());
        }
        Command::RenderForm { payment, context } => {
            let controller = build_controller(&cli, Arc::new(InMemoryPaymentStore::new()))?;
            let payment = read_payment(File::open(payment).into_diagnostic()?).into_diagnostic()?;
            let context = load_context(context.as_deref())?;

            let form = controller
                .payment_form(&payment, &context)
                .await
                .into_diagnostic()?;
            write_pretty(io::stdout().lock(), &form).into_diagnostic()?;
        }
        Command::Pay {
            payment,
            nonce,
            context,
            fields,
            db_path,
        } => {
            let store = open_store(db_path.clone())?;
            let controller = build_controller(&cli, store)?;
            let mut payment =
                read_payment(File::open(payment).into_diagnostic()?).into_diagnostic()?;
            let context = load_context(context.as_deref())?;

            controller.validate(&payment, true).into_diagnostic()?;
            let form = controller
                .payment_form(&payment, &context)
                .await
                .into_diagnostic()?;

            let submission = fields.iter().fold(
                FormSubmission::default().with(NONCE_FIELD, nonce.clone()),
                |submission, (name, value)| submission.with(name.clone(), value.clone()),
            );
            controller
                .validate_form(&form, &submission, &mut payment)
                .into_diagnostic()?;

            let status = controller.execute(&mut payment).await.into_diagnostic()?;
            PaymentWriter::new(io::stdout().lock())
                .write_payments([&payment])
                .into_diagnostic()?;
            if status != PaymentStatus::Success {
                return Err(miette!("Payment {} failed", payment.pid.unwrap_or_default()));
            }
        }
        Command::Payments { db_path } => {
            let store = open_store(db_path.clone())?;
            let payments = store.all().await.into_diagnostic()?;
            PaymentWriter::new(io::stdout().lock())
                .write_payments(&payments)
                .into_diagnostic()?;
        }
    }

    Ok(())
}
