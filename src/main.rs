//! Codeplug tool
//! Encodes JSON configurations into device images and decodes them back

use anyhow::{anyhow, bail, Context};
use dmr_codeplug::callsigndb::{CallsignDb, Selection, UserDatabase};
use dmr_codeplug::codeplug::{Codeplug, Flags};
use dmr_codeplug::config::Config;
use dmr_codeplug::core::MessageLog;
use dmr_codeplug::drivers::{find_driver, init_drivers, list_drivers, DriverInfo};
use dmr_codeplug::formats::{load_img, save_img, ImageKind, Metadata};
use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use tracing_subscriber::{prelude::*, EnvFilter};

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <command> [args]", program);
    eprintln!("\nCommands:");
    eprintln!("  devices                                     List supported devices");
    eprintln!("  encode <model> <config.json> <out.img> [flags.json]");
    eprintln!("  decode <in.img> <config.json> [model]");
    eprintln!("  callsigndb <model> <users.json> <out.img> [limit] [own-id]");
    eprintln!("  info <in.img>                               Summarize an image file");
    std::process::exit(1);
}

fn print_messages(log: &MessageLog) {
    for message in log.messages() {
        println!("{}", message);
    }
}

fn codeplug_driver(model: &str) -> anyhow::Result<DriverInfo> {
    let driver = find_driver(model).ok_or_else(|| anyhow!("Unknown device {}", model))?;
    if driver.codeplug.is_none() {
        bail!("{} has no codeplug support", driver.full_name());
    }
    Ok(driver)
}

fn cmd_devices() {
    println!(
        "{:<10} {:<12} {:<9} {:<10} Description",
        "Vendor", "Model", "Codeplug", "Callsigns"
    );
    for driver in list_drivers() {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        println!(
            "{:<10} {:<12} {:<9} {:<10} {}",
            driver.vendor,
            driver.model,
            yes_no(driver.codeplug.is_some()),
            yes_no(driver.callsign_db.is_some()),
            driver.description
        );
    }
}

fn cmd_encode(
    model: &str,
    config_path: &str,
    out: &str,
    flags_path: Option<&str>,
) -> anyhow::Result<()> {
    let driver = codeplug_driver(model)?;
    let layout = driver.codeplug.ok_or_else(|| anyhow!("no layout"))?;

    let file = File::open(config_path).with_context(|| format!("Cannot open {}", config_path))?;
    let config: Config = serde_json::from_reader(BufReader::new(file))?;
    let flags: Flags = match flags_path {
        Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        None => Flags::default(),
    };

    let mut codeplug = Codeplug::new(layout);
    let log = codeplug.encode(&config, &flags)?;
    print_messages(&log);
    codeplug.sort();

    let metadata = Metadata::new(&driver.vendor, &driver.model);
    save_img(out, codeplug.images(), &metadata)?;
    println!("Wrote {} codeplug to {}", driver.full_name(), out);
    Ok(())
}

fn cmd_decode(input: &str, config_path: &str, model: Option<&str>) -> anyhow::Result<()> {
    let (images, metadata) = load_img(input)?;
    if metadata.kind != ImageKind::Codeplug {
        bail!("{} does not hold a codeplug", input);
    }
    let model = model.unwrap_or(&metadata.model);
    let driver = codeplug_driver(model)?;
    let layout = driver.codeplug.ok_or_else(|| anyhow!("no layout"))?;

    let codeplug = Codeplug::from_images(layout, images)?;
    let mut config = Config::new();
    let log = codeplug.decode(&mut config)?;
    print_messages(&log);

    let file = File::create(config_path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &config)?;
    println!(
        "Decoded {} channels, {} contacts, {} zones into {}",
        config.channels.len(),
        config.contacts.len(),
        config.zones.len(),
        config_path
    );
    Ok(())
}

fn cmd_callsigndb(
    model: &str,
    users_path: &str,
    out: &str,
    limit: Option<&str>,
    own_id: Option<&str>,
) -> anyhow::Result<()> {
    let driver = find_driver(model).ok_or_else(|| anyhow!("Unknown device {}", model))?;
    let layout = driver
        .callsign_db
        .ok_or_else(|| anyhow!("{} has no callsign database", driver.full_name()))?;

    let mut users = UserDatabase::load(users_path)?;
    if let Some(id) = own_id {
        users.sort_by_proximity(id.parse().context("Invalid DMR ID")?);
    }
    let selection = match limit {
        Some(n) => Selection::with_limit(n.parse().context("Invalid limit")?),
        None => Selection::default(),
    };

    let mut db = CallsignDb::new(layout);
    let count = db.encode(&users, &selection)?;

    let mut metadata =
        Metadata::new(&driver.vendor, &driver.model).with_kind(ImageKind::CallsignDb);
    metadata.set_extra("entries", serde_json::json!(count));
    save_img(out, std::slice::from_ref(db.image()), &metadata)?;
    println!("Wrote {} entries for {} to {}", count, driver.full_name(), out);
    Ok(())
}

fn cmd_info(input: &str) -> anyhow::Result<()> {
    let (images, metadata) = load_img(input)?;
    println!("Device: {} {}", metadata.vendor, metadata.model);
    println!("Written by version: {}", metadata.tool_version);
    for (bank, image) in images.iter().enumerate() {
        println!("Bank {}: {}", bank, image);
    }

    let driver = find_driver(&metadata.model);
    match (metadata.kind, driver) {
        (ImageKind::Codeplug, Some(DriverInfo { codeplug: Some(layout), .. })) => {
            let codeplug = Codeplug::from_images(layout, images)?;
            let mut config = Config::new();
            let log = codeplug.decode(&mut config)?;
            println!("Radio name: {}", config.settings.radio_name);
            println!("Channels: {}", config.channels.len());
            println!("Contacts: {}", config.contacts.len());
            println!("Zones: {}", config.zones.len());
            println!("Scan lists: {}", config.scan_lists.len());
            println!("Messages: {}", log.len());
        }
        (ImageKind::CallsignDb, Some(DriverInfo { callsign_db: Some(layout), .. })) => {
            let image = images.into_iter().next().unwrap_or_default();
            let users = CallsignDb::from_image(layout, image).decode()?;
            println!("Callsign entries: {}", users.len());
            if let (Some(first), Some(last)) = (users.first(), users.last()) {
                println!("ID range: {} - {}", first.id, last.id);
            }
        }
        _ => println!("No decoder for this image"),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format_layer = tracing_subscriber::fmt::layer().with_target(true);
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();

    init_drivers();

    let args: Vec<String> = env::args().collect();
    let arg = |n: usize| args.get(n).map(|s| s.as_str());
    let program = arg(0).unwrap_or("codeplug-tool");

    match (arg(1), arg(2), arg(3), arg(4)) {
        (Some("devices"), ..) => {
            cmd_devices();
            Ok(())
        }
        (Some("encode"), Some(model), Some(config), Some(out)) => {
            cmd_encode(model, config, out, arg(5))
        }
        (Some("decode"), Some(input), Some(config), model) => cmd_decode(input, config, model),
        (Some("callsigndb"), Some(model), Some(users), Some(out)) => {
            cmd_callsigndb(model, users, out, arg(5), arg(6))
        }
        (Some("info"), Some(input), ..) => cmd_info(input),
        _ => usage(program),
    }
}
