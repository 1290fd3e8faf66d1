use clap::Parser;
use hiredis::Reader;
use hiredis::ReaderConfig;
use hiredis::ReplyValue;
use log::error;
use log::info;

/// Feed a canned reply stream to a reader in fixed-size chunks.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
	/// Bytes delivered per simulated read
	#[arg(short, long, default_value_t = 3)]
	chunk_size: usize,

	/// Hand out payloads as raw bytes instead of text
	#[arg(long)]
	return_buffers: bool,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

fn main() {
	let args = Cli::parse();
	if let Err(e) = telemetry::init(&args.log_level) {
		eprintln!("Failed to initialize logger: {}", e);
		return;
	}

	// Replies a server might send for PING, GET, LRANGE and an unknown command.
	let mut stream = Vec::new();
	for reply in [
		ReplyValue::simple("PONG"),
		ReplyValue::bulk("bar"),
		ReplyValue::array(vec!["a".into(), "b".into(), ReplyValue::nil_bulk()]),
		ReplyValue::error("ERR unknown command 'NOPE'"),
	] {
		stream.extend_from_slice(&reply.encode());
	}

	let config = ReaderConfig::default().return_buffers(args.return_buffers);
	let mut reader = match Reader::with_config(config) {
		Ok(reader) => reader,
		Err(e) => {
			error!("Invalid reader config: {}", e);
			return;
		}
	};

	for (i, chunk) in stream.chunks(args.chunk_size.max(1)).enumerate() {
		info!("Chunk {}: {:?}", i, String::from_utf8_lossy(chunk));
		reader.feed(chunk);

		loop {
			match reader.get() {
				Ok(Some(reply)) => info!("Reply: {:?}", reply),
				Ok(None) => break,
				Err(e) => {
					error!("Discarding reader: {}", e);
					return;
				}
			}
		}
	}
}
