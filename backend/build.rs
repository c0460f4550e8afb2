use std::fs;
use std::path::Path;

// Copies the trunk build of the client into `static/dist` so it can be
// embedded. Without a client build the placeholder page stays in place.
fn main() {
    let out_dir = Path::new("static/dist");
    let dist_dir = Path::new("../frontend/dist");

    if dist_dir.exists() {
        if let Err(e) = copy_client(dist_dir, out_dir) {
            println!(
                "cargo:warning=Client build not embedded, serving the placeholder page: {}",
                e
            );
        }
    }
    println!("cargo:rerun-if-changed=../frontend/dist");
}

fn copy_client(dist_dir: &Path, out_dir: &Path) -> Result<(), String> {
    if out_dir.exists() {
        fs::remove_dir_all(out_dir).map_err(|e| format!("cannot clear {}: {}", out_dir.display(), e))?;
    }
    fs::create_dir_all(out_dir).map_err(|e| format!("cannot create {}: {}", out_dir.display(), e))?;
    fs_extra::dir::copy(
        dist_dir,
        out_dir,
        &fs_extra::dir::CopyOptions::new()
            .overwrite(true)
            .content_only(true),
    )
    .map_err(|e| format!("cannot copy {}: {}", dist_dir.display(), e))?;
    Ok(())
}
