//! hkv-gen - generate and inspect selective hash-field accessors

use clap::{Args, Parser, Subcommand};
use cmds::common::SchemaInputs;
use hkv_gen::config::{GeneratorConfig, PASSWORD_ENV};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cmds;

#[derive(Parser)]
#[command(name = "hkv-gen")]
#[command(about = "Selective hash-field accessor generator", long_about = None)]
struct Cli {
    /// Generator configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Input YAML schema files
    #[arg(short = 'f', long = "files", value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Serialized protobuf FileDescriptorSet (protoc --descriptor_set_out)
    #[arg(long = "descriptor-set", value_name = "FILE")]
    descriptor_sets: Vec<PathBuf>,
}

impl From<InputArgs> for SchemaInputs {
    fn from(args: InputArgs) -> Self {
        SchemaInputs {
            files: args.files,
            descriptor_sets: args.descriptor_sets,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one accessor unit per package
    Codegen {
        #[command(flatten)]
        inputs: InputArgs,

        /// Output directory for generated code (overrides the config file)
        #[arg(short = 'o', long = "output", value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Path generated code uses for the runtime crate
        #[arg(long = "runtime-crate", value_name = "PATH")]
        runtime_crate: Option<String>,

        /// Enable verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /// Show the storage strategy, native type and capability of every field
    Analyze {
        #[command(flatten)]
        inputs: InputArgs,

        /// Print the resolved schema as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read raw field values of one record from the configured store
    Fetch {
        #[arg(long)]
        namespace: String,

        #[arg(long = "id-a")]
        id_a: u64,

        #[arg(long = "id-b")]
        id_b: u64,

        /// Comma separated field tags
        #[arg(long, value_delimiter = ',', required = true)]
        fields: Vec<u32>,

        /// Store address, overrides the config file
        #[arg(long)]
        address: Option<String>,

        #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
        password: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = GeneratorConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Codegen {
            inputs,
            output_dir,
            runtime_crate,
            verbose,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(runtime) = runtime_crate {
                config.runtime_crate = runtime;
            }
            cmds::codegen::run(
                &inputs.into(),
                &config.codegen_options(),
                &config.output_dir,
                verbose,
            )?;
        }

        Commands::Analyze { inputs, json } => {
            cmds::analyze::run(&inputs.into(), json)?;
        }

        Commands::Fetch {
            namespace,
            id_a,
            id_b,
            fields,
            address,
            password,
        } => {
            if let Some(address) = address {
                config.store.address = address;
            }
            let options = config.store.connect_options(password);
            cmds::fetch::run(&options, &namespace, id_a, id_b, &fields)?;
        }
    }

    Ok(())
}
