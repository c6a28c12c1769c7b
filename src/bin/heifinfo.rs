use clap::{ArgAction, Parser};
use anyhow::Context;
use heifmeta::reader::DEFAULT_CHUNK_LENGTH;
use heifmeta::util::hex_preview;
use heifmeta::{
    BoxNode, ByteArrayReader, Metadata, RandomAccessFileReader, RandomAccessReader, StreamReader, TagValue,
    get_boxes, read_metadata,
};
use std::fs::File;
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "HEIF metadata dump")]
struct Args {
    /// HEIF file path
    path: PathBuf,

    /// Output as JSON instead of human-readable text
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Read through the chunked stream backend
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "memory")]
    stream: bool,

    /// Chunk length used with --stream
    #[arg(long, default_value_t = DEFAULT_CHUNK_LENGTH)]
    chunk_size: usize,

    /// Load the whole file into memory first
    #[arg(long, action = ArgAction::SetTrue)]
    memory: bool,

    /// List the box tree instead of extracting metadata
    #[arg(long, action = ArgAction::SetTrue)]
    boxes: bool,

    /// Bytes shown for byte-valued tags
    #[arg(long, default_value_t = 64)]
    bytes: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let data: Vec<u8>;
    let mut reader: Box<dyn RandomAccessReader + '_> = if args.memory {
        data = std::fs::read(&args.path).with_context(|| format!("reading {}", args.path.display()))?;
        Box::new(ByteArrayReader::new(&data))
    } else if args.stream {
        let chunk_size = NonZeroUsize::new(args.chunk_size).context("--chunk-size must be positive")?;
        let file = File::open(&args.path).with_context(|| format!("opening {}", args.path.display()))?;
        Box::new(StreamReader::with_chunk_length(file, chunk_size))
    } else {
        Box::new(
            RandomAccessFileReader::open(&args.path).with_context(|| format!("opening {}", args.path.display()))?,
        )
    };

    if args.boxes {
        let boxes = get_boxes(reader.as_mut());
        if args.json {
            println!("{}", serde_json::to_string_pretty(&boxes)?);
        } else {
            print_tree(&boxes, 0);
        }
        return Ok(());
    }

    let metadata = read_metadata(reader.as_mut());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        print_human(&metadata, args.bytes);
    }
    Ok(())
}

fn print_human(metadata: &Metadata, bytes: usize) {
    for directory in &metadata.directories {
        println!("[{}]", directory.name);
        for tag in &directory.tags {
            match &tag.value {
                TagValue::Bytes(data) => {
                    println!("  {}: {} bytes", tag.name, data.len());
                    for line in hex_preview(data, bytes).lines() {
                        println!("    {line}");
                    }
                }
                value => println!("  {}: {}", tag.name, value),
            }
        }
        for warning in &directory.warnings {
            println!("  warning: {warning}");
        }
    }
}

fn print_tree(nodes: &[BoxNode], depth: usize) {
    for node in nodes {
        let version = match (node.version, node.flags) {
            (Some(v), Some(f)) => format!(" v{v} flags={f:#08x}"),
            _ => String::new(),
        };
        println!(
            "{:indent$}{} ({}) offset={} size={}{}",
            "",
            node.typ,
            node.full_name,
            node.offset,
            node.size,
            version,
            indent = depth * 2
        );
        if let Some(children) = &node.children {
            print_tree(children, depth + 1);
        }
    }
}
