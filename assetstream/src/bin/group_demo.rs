//! Resource group demo
//!
//! Reads a group definition (JSON) from the host filesystem, loads it step by
//! step, prints the notifications, then unloads it.
//!
//! Usage: `group_demo <definition.json> [loader-config.json]`
//!
//! Set `RUST_LOG=debug` to see the group and blob logs.

use std::sync::Arc;

use assetstream::io::{ByteBuffer, FileStream, OpenMode, StdFs};
use assetstream::resource::{
    DefinitionTree, LoaderConfig, Progress, ResourceContext, ResourceGroup, ResourceRegistry,
    BLOB_TYPE,
};
use tracing_subscriber::EnvFilter;

/// Read a whole file through a `FileStream`
fn read_file(path: &str) -> Result<ByteBuffer<'static>, Box<dyn std::error::Error>> {
    let mut stream = FileStream::new(path);
    if !stream.exists() {
        return Err(format!("{path}: no such file").into());
    }
    stream.open(OpenMode::READ_ONLY)?;
    let mut buffer = ByteBuffer::new();
    stream.read_to_end(&mut buffer)?;
    stream.close()?;
    Ok(buffer)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(definition_path) = args.next() else {
        eprintln!("Usage: group_demo <definition.json> [loader-config.json]");
        std::process::exit(2);
    };

    let config = match args.next() {
        Some(config_path) => LoaderConfig::from_reader(read_file(&config_path)?)?,
        None => LoaderConfig::default(),
    };
    println!("Loader config: {config:?}");

    let definition = DefinitionTree::from_reader(read_file(&definition_path)?)?;

    let mut registry = ResourceRegistry::new(config);
    registry.register_blob(StdFs);
    let registry = Arc::new(registry);
    let mut events = registry.events().subscribe();

    let mut group = ResourceGroup::new(registry.clone());
    group.create(&definition_path, &definition)?;
    println!(
        "Group '{}': {} resources, dependencies {:?}",
        group.name(),
        group.len(),
        group.dependencies()
    );

    let mut steps = 1;
    while group.load()? == Progress::Pending {
        steps += 1;
    }
    println!("Loaded in {steps} step(s)");

    for handle in group.resources(BLOB_TYPE) {
        let resource = handle.lock();
        println!("  {}:{} {:?}", resource.type_name(), resource.name(), resource.state());
    }

    group.unload()?;
    group.destroy()?;

    while let Ok(event) = events.try_recv() {
        println!("Event: {event:?}");
    }
    Ok(())
}
