use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use churn_predict::attributes::RawAttributes;
use churn_predict::encoder;
use churn_predict::input::{
    self, ArtifactPaths, DEFAULT_COLUMNS_PATH, DEFAULT_MODEL_PATH, MONTHLY_CHARGES_RANGE,
    TOTAL_CHARGES_RANGE,
};
use churn_predict::predictor::Predictor;
use churn_predict::report;
use churn_predict::schema::{SchemaColumns, SchemaCoverage, align};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "churn-predict",
    about = "Predict customer churn from form attributes with a trained classifier",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Commands,
    /// Serialized classifier (JSON)
    #[arg(long, global = true, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,
    /// Ordered list of schema columns (JSON array)
    #[arg(long, global = true, default_value = DEFAULT_COLUMNS_PATH)]
    columns: PathBuf,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Predict whether a customer is likely to churn
    Predict {
        #[command(flatten)]
        customer: CustomerArgs,
        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the aligned feature vector without running the model
    Encode {
        #[command(flatten)]
        customer: CustomerArgs,
        /// Print columns and values as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Report which schema columns the encoder fills
    Schema {
        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Customer attributes; defaults match the form's initial selections.
#[derive(ClapArgs, Debug)]
struct CustomerArgs {
    /// Read attributes from a JSON object instead of the flags below
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = [
            "senior_citizen", "tenure", "monthly_charges", "total_charges",
            "gender", "partner", "dependents", "phone", "internet", "contract",
            "paperless", "online_sec", "device_prot", "payment",
        ]
    )]
    input: Option<PathBuf>,
    #[arg(long = "senior-citizen", default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    senior_citizen: u8,
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(0..=100))]
    tenure: u32,
    #[arg(long = "monthly-charges", default_value_t = 50.0, value_parser = parse_monthly_charges)]
    monthly_charges: f64,
    #[arg(long = "total-charges", default_value_t = 100.0, value_parser = parse_total_charges)]
    total_charges: f64,
    /// Female | Male
    #[arg(long, default_value = "Female")]
    gender: String,
    /// No | Yes
    #[arg(long, default_value = "No")]
    partner: String,
    /// No | Yes
    #[arg(long, default_value = "No")]
    dependents: String,
    /// Phone service: No | Yes
    #[arg(long, default_value = "No")]
    phone: String,
    /// DSL | Fiber optic | No
    #[arg(long, default_value = "DSL")]
    internet: String,
    /// Month-to-month | One year | Two year
    #[arg(long, default_value = "Month-to-month")]
    contract: String,
    /// Paperless billing: No | Yes
    #[arg(long, default_value = "No")]
    paperless: String,
    /// Online security: No | Yes | No internet service
    #[arg(long = "online-security", default_value = "No")]
    online_sec: String,
    /// Device protection: No | Yes | No internet service
    #[arg(long = "device-protection", default_value = "No")]
    device_prot: String,
    /// Credit card (automatic) | Bank transfer (automatic) | Electronic check | Mailed check
    #[arg(long, default_value = "Credit card (automatic)")]
    payment: String,
}

fn parse_bounded(s: &str, range: &RangeInclusive<f64>) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if !range.contains(&value) {
        return Err(format!(
            "{value} is not in {}..={}",
            range.start(),
            range.end()
        ));
    }
    Ok(value)
}

fn parse_monthly_charges(s: &str) -> Result<f64, String> {
    parse_bounded(s, &MONTHLY_CHARGES_RANGE)
}

fn parse_total_charges(s: &str) -> Result<f64, String> {
    parse_bounded(s, &TOTAL_CHARGES_RANGE)
}

impl CustomerArgs {
    fn into_attributes(self) -> Result<RawAttributes> {
        if let Some(path) = &self.input {
            return input::load_attributes(path);
        }
        let raw = RawAttributes {
            senior_citizen: self.senior_citizen,
            tenure: self.tenure,
            monthly_charges: self.monthly_charges,
            total_charges: self.total_charges,
            gender: self.gender,
            partner: self.partner,
            dependents: self.dependents,
            phone: self.phone,
            internet: self.internet,
            contract: self.contract,
            paperless: self.paperless,
            online_sec: self.online_sec,
            device_prot: self.device_prot,
            payment: self.payment,
        };
        input::check_ranges(&raw)?;
        Ok(raw)
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn load_schema(path: &Path) -> Result<SchemaColumns> {
    input::load_schema(path).context("schema columns are required")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Predict { customer, json } => {
            let paths = ArtifactPaths {
                model: args.model,
                columns: args.columns,
            };
            info!(model = %paths.model.display(), columns = %paths.columns.display(), "starting predict");
            let predictor = Predictor::load(&paths).context("failed to load startup artifacts")?;
            let raw = customer.into_attributes()?;
            let result = predictor
                .predict(&raw)
                .context("prediction failed for this customer")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{result}");
            }
            info!(label = ?result.label, probability = result.probability, "predict completed");
        }
        Commands::Encode { customer, json } => {
            let schema = load_schema(&args.columns)?;
            let raw = customer.into_attributes()?;
            let features = encoder::encode(&raw)?;
            let aligned = align(&features, &schema)?;

            if json {
                let body = serde_json::json!({
                    "columns": aligned.columns().names(),
                    "values": aligned.values(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print!("{}", report::render_vector(&aligned));
            }
        }
        Commands::Schema { json } => {
            let schema = load_schema(&args.columns)?;
            let coverage = SchemaCoverage::of(&schema);
            if !coverage.dropped.is_empty() {
                warn!(
                    dropped = coverage.dropped.len(),
                    "some encoder keys have no schema column"
                );
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&coverage)?);
            } else {
                print!("{}", report::render_coverage(&coverage));
            }
        }
    }

    Ok(())
}
