//! modport locate コマンド

use super::open_session;
use clap::Parser;
use modport::error::Result;
use modport::settings::Settings;
use modport::{ResourceKey, TypeTag};

#[derive(Debug, Parser)]
pub struct Args {
    /// Resource type
    #[arg(long)]
    pub kind: String,

    /// Resource key (<package>::<name>)
    pub key: String,
}

pub fn run(args: Args, settings: &Settings) -> Result<()> {
    let session = open_session(settings)?;
    let key = ResourceKey::parse(&args.key)?;
    let folder = session.locate_folder(&TypeTag::new(args.kind.as_str()), &key)?;
    println!("{}", folder.display());
    Ok(())
}
