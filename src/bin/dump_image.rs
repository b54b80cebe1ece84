//! Image dump utility
//! Prints metadata, the element table and optionally a hex dump of an image file

use dmr_codeplug::formats::load_img;
use std::env;

fn parse_address(s: &str) -> anyhow::Result<u32> {
    let value = match s.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16)?,
        None => s.parse()?,
    };
    Ok(value)
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.img> [--hex [address [length]]]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} codeplug.img                  # Metadata and elements", args[0]);
        eprintln!("  {} codeplug.img --hex            # Dump every element", args[0]);
        eprintln!("  {} codeplug.img --hex 0x2000 64  # Dump 64 bytes", args[0]);
        std::process::exit(1);
    }

    let (images, metadata) = load_img(&args[1])?;
    println!("Device: {} {}", metadata.vendor, metadata.model);
    println!("Kind: {:?}", metadata.kind);
    println!("Tool version: {}", metadata.tool_version);
    for (key, value) in &metadata.extra {
        println!("{}: {}", key, value);
    }
    println!();

    println!("=== Elements ===");
    for (bank, image) in images.iter().enumerate() {
        for element in image.elements() {
            println!(
                "bank {}  0x{:08x}..0x{:08x}  {:>8} bytes",
                bank,
                element.address(),
                element.end(),
                element.size()
            );
        }
    }

    if args.get(2).map(|s| s.as_str()) != Some("--hex") {
        return Ok(());
    }
    let address = args.get(3).map(|s| parse_address(s)).transpose()?;
    let length = args.get(4).map(|s| s.parse::<usize>()).transpose()?;

    for (bank, image) in images.iter().enumerate() {
        for element in image.elements() {
            let (start, end) = match address {
                None => (None, None),
                Some(a) if element.contains(a) => {
                    let start = (a - element.address()) as usize;
                    (Some(start), length.map(|l| start + l))
                }
                Some(_) => continue,
            };
            println!("\n=== Bank {} element 0x{:08x} ===", bank, element.address());
            println!("{}", element.printable(start, end));
        }
    }
    Ok(())
}
