//! # iam-trust-guard CLI Entry Point
//!
//! Parses arguments, sets up logging and dispatches to the analysis library.
//! Exit status: 0 on success, 1 on validation failure or any fatal error,
//! 2 when `--fail-on` finds a finding at or above its threshold.

mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use iam_trust_guard_analysis::{
    analyze_trust_policy_file, filter_findings, validate_scp_file, AuditReport, AwsOptions,
    RiskLevel, TrustGuardService,
};
use log::debug;

const EXIT_FAILURE: u8 = 1;
const EXIT_THRESHOLD_REACHED: u8 = 2;

/// IAM Trust Guard: audit who can assume your IAM roles and check that
/// Service Control Policies are well-formed.
#[derive(Parser, Debug)]
#[command(name = "iam-trust-guard", version, about)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify the principals allowed to assume IAM roles
    AnalyzeTrustPolicies(AnalyzeTrustPoliciesArgs),
    /// Validate the structure of a Service Control Policy file
    ValidateScp(ValidateScpArgs),
}

#[derive(Args, Debug)]
struct AwsArgs {
    /// AWS profile to use
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// AWS region to use
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,
}

impl From<&AwsArgs> for AwsOptions {
    fn from(args: &AwsArgs) -> Self {
        Self {
            profile: args.profile.clone(),
            region: args.region.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Print the result as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, requires = "json")]
    pretty: bool,
}

#[derive(Args, Debug)]
struct AnalyzeTrustPoliciesArgs {
    /// Analyze this trust policy file instead of listing the roles in the account
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Role name reported for --file (defaults to the file name without extension)
    #[arg(long, requires = "file")]
    role_name: Option<String>,

    /// Account treated as trusted; looked up with STS GetCallerIdentity when omitted
    #[arg(long, value_parser = parse_account_id)]
    account_id: Option<String>,

    /// Only report findings at or above this risk (low, medium, high)
    #[arg(long, default_value = "low")]
    min_risk: RiskLevel,

    /// Exit with status 2 if any finding is at or above this risk
    #[arg(long)]
    fail_on: Option<RiskLevel>,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    aws: AwsArgs,
}

#[derive(Args, Debug)]
struct ValidateScpArgs {
    /// Path to the SCP JSON file
    path: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

fn parse_account_id(value: &str) -> Result<String, String> {
    if value.len() == 12 && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(value.to_string())
    } else {
        Err(format!("'{value}' is not a 12-digit AWS account id"))
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("Parsed arguments: {:?}", cli);

    let result = match cli.command {
        Commands::AnalyzeTrustPolicies(args) => analyze_trust_policies(args).await,
        Commands::ValidateScp(args) => validate_scp(args).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn analyze_trust_policies(args: AnalyzeTrustPoliciesArgs) -> Result<ExitCode> {
    let aws_options = AwsOptions::from(&args.aws);

    let mut report = match &args.file {
        Some(path) => {
            let account_id = match &args.account_id {
                Some(account_id) => account_id.clone(),
                None => TrustGuardService::new(&aws_options)
                    .await
                    .context("Failed to initialize AWS clients")?
                    .resolve_account_id(None)
                    .await
                    .context("Failed to determine the caller account id")?,
            };
            let role = analyze_trust_policy_file(path, args.role_name.as_deref(), &account_id)
                .await
                .with_context(|| format!("Failed to analyze {}", path.display()))?;
            AuditReport {
                account_id,
                roles: vec![role],
            }
        }
        None => TrustGuardService::new(&aws_options)
            .await
            .context("Failed to initialize AWS clients")?
            .audit_account(args.account_id.as_deref())
            .await
            .context("Failed to audit role trust policies")?,
    };

    let summary = output::audit_summary(&report);
    let highest = report.highest_risk();
    let reached_threshold = args
        .fail_on
        .filter(|threshold| highest.is_some_and(|risk| risk >= *threshold));

    for role in &mut report.roles {
        role.findings = filter_findings(&role.findings, args.min_risk);
    }

    if args.output.json {
        output::output_json(&report, args.output.pretty)?;
    } else {
        output::print_findings(&report);
    }
    output::note(&summary);

    if let Some(threshold) = reached_threshold {
        output::note(&format!("found trust policy risks at or above {threshold}"));
        return Ok(ExitCode::from(EXIT_THRESHOLD_REACHED));
    }
    Ok(ExitCode::SUCCESS)
}

async fn validate_scp(args: ValidateScpArgs) -> Result<ExitCode> {
    let report = validate_scp_file(&args.path)
        .await
        .with_context(|| format!("Failed to validate {}", args.path.display()))?;

    if args.output.json {
        output::output_validation_json(&report, args.output.pretty)?;
    } else {
        output::print_validation_report(&report);
    }

    if report.is_valid() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_FAILURE))
    }
}
