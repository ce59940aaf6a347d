use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("gelfchunk {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: gelfchunk");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("GELFCHUNK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "chunking: mtu={} chunk={} max_chunks={} max_message={}",
        gelfchunk_frame::MTU_SIZE,
        gelfchunk_frame::MAX_CHUNK_SIZE,
        gelfchunk_frame::MAX_CHUNK_COUNT,
        gelfchunk_frame::MAX_MESSAGE_SIZE
    );

    Ok(SUCCESS)
}
