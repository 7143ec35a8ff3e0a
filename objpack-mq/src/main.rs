mod json;

use objpack::*;
use std::io::{self, Read, Write};
use anyhow::{Context, Result};
use structopt::StructOpt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Decode and print MessagePack messages
#[derive(StructOpt)]
#[structopt(name = "mq", author = "Liv Fischer")]
struct Opt {
    /// accept and produce map keys other than strings
    #[structopt(short, long)]
    non_str_keys: bool,
    /// sort map keys when encoding
    #[structopt(short, long)]
    sort_keys: bool,
    /// read JSON and encode it into binary MessagePack instead
    #[structopt(short, long)]
    encode: bool,
}

impl Opt {
    fn options(&self) -> Options {
        let mut options = Options::empty();
        if self.non_str_keys {
            options |= Options::NON_STR_KEYS;
        }
        if self.sort_keys {
            options |= Options::SORT_KEYS;
        }
        options
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let opt = Opt::from_args();
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer).context("Failed to read stdin")?;
    debug!(len = buffer.len(), options = ?opt.options(), "read input");
    if opt.encode {
        encode_json(&buffer, opt.options())
    } else {
        print(&buffer, opt.options())
    }
}

/// Extensions have no text form of their own
fn show_ext(tag: i8, data: &[u8]) -> std::result::Result<Object, BoxError> {
    Ok(Object::Str(format!("Ext({}, {})", tag, base64::encode(data))))
}

fn print(buffer: &[u8], options: Options) -> Result<()> {
    let mut hook = show_ext;
    let value = decode(buffer, Some(&mut hook), options).context("Decoding error")?;
    println!("{}", &value);
    Ok(())
}

fn encode_json(buffer: &[u8], options: Options) -> Result<()> {
    let json: serde_json::Value = serde_json::from_slice(buffer).context("input is not valid JSON")?;
    let value = json::to_object(&json);
    let bytes = encode(&value, None, options).context("Encoding error")?;
    io::stdout().write_all(&bytes).context("Failed to write stdout")?;
    Ok(())
}
