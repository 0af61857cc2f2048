use anyhow::Result;
use std::process::Command;
use which::which;

pub async fn run() -> Result<()> {
    println!("mashup dependency check\n");

    let mut all_ok = true;

    all_ok &= check_tool("yt-dlp", &["--version"], "Install with: pipx install yt-dlp");
    all_ok &= check_tool("ffmpeg", &["-version"], "Install FFmpeg with your package manager");
    all_ok &= check_tool("ffprobe", &["-version"], "ffprobe ships with FFmpeg");

    println!();
    if all_ok {
        println!("All dependencies OK!");
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
    }

    Ok(())
}

fn check_tool(name: &str, version_args: &[&str], hint: &str) -> bool {
    print!("{:<9}", format!("{}:", name));
    match which(name) {
        Ok(path) => match Command::new(&path).args(version_args).output() {
            Ok(out) => {
                let first_line = String::from_utf8_lossy(&out.stdout)
                    .lines()
                    .next()
                    .unwrap_or("")
                    .to_string();
                // FFmpeg tools print "<name> version N.N ..."; yt-dlp
                // prints the bare version
                let version = if first_line.starts_with(&format!("{} version", name)) {
                    first_line
                        .split_whitespace()
                        .nth(2)
                        .unwrap_or("unknown")
                        .to_string()
                } else {
                    first_line.trim().to_string()
                };
                println!("OK ({})", version);
                true
            }
            Err(_) => {
                println!("FOUND but failed to get version");
                false
            }
        },
        Err(_) => {
            println!("NOT FOUND");
            println!("         {}", hint);
            false
        }
    }
}
