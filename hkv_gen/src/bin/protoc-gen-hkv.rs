//! protoc plugin: `protoc --hkv_out=<dir> [--hkv_opt=runtime_crate=...] foo.proto`

use anyhow::Context;
use prost::Message;
use prost_types::compiler::CodeGeneratorRequest;
use std::io::{Read, Write};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    /* stdout carries the response */
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .context("reading CodeGeneratorRequest from stdin")?;
    let request = CodeGeneratorRequest::decode(input.as_slice())
        .context("decoding CodeGeneratorRequest")?;

    let response = hkv_gen::plugin::run(&request);
    if let Some(error) = &response.error {
        tracing::warn!(%error, "generation failed");
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&response.encode_to_vec())?;
    stdout.flush()?;
    Ok(())
}
