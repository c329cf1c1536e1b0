use std::{env, path::PathBuf};

const WATCHED_VARIABLES: [&str; 4] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"];

/// Where vcpkg would have installed FFmpeg for the active triplet.
fn vcpkg_ffmpeg_dir() -> Option<PathBuf> {
    let root = env::var_os("VCPKG_ROOT")?;
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    Some(PathBuf::from(root).join("installed").join(triplet))
}

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // ffmpeg-sys-next finds FFmpeg through pkg-config everywhere but Windows.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows")
        || env::var_os("FFMPEG_DIR").is_some()
    {
        return;
    }

    match vcpkg_ffmpeg_dir() {
        None => println!(
            "cargo:warning=framegrab: FFMPEG_DIR is not set. Install FFmpeg with vcpkg and set VCPKG_ROOT or FFMPEG_DIR."
        ),
        Some(dir) if dir.exists() => {
            println!(
                "cargo:warning=framegrab: found vcpkg FFmpeg at {}; set FFMPEG_DIR to that path to pin it.",
                dir.display()
            );
            if env::var_os("VCPKGRS_DYNAMIC").is_none() {
                println!(
                    "cargo:warning=framegrab: set VCPKGRS_DYNAMIC=1 if that FFmpeg build is dynamic."
                );
            }
        }
        Some(dir) => println!(
            "cargo:warning=framegrab: VCPKG_ROOT is set but {} does not exist.",
            dir.display()
        ),
    }
}
