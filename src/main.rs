use clap::{arg,crate_version,Command};
use std::path::{Path,PathBuf};
use hzip::hzip as codec;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";

fn ok_to_overwrite(path_out: &Path) -> bool {
    if let Ok(_f) = std::fs::File::open(path_out) {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out.display());
        std::io::stdin().read_line(&mut ans).expect("could not read stdin");
        if ans.trim_end()=="y" || ans.trim_end()=="Y" {
            log::warn!("existing file will not be truncated");
            return true;
        }
        return false;
    }
    true
}

/// extension of the input path as a plain string, empty if there is none
fn extension_of(path: &Path) -> String {
    match path.extension() {
        Some(os) => os.to_string_lossy().to_string(),
        None => String::new()
    }
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Compress:      `hzip compress -i notes.txt` (writes notes.hzip)
Expand:        `hzip expand -i notes.hzip` (restores the stored extension)";

    let mut main_cmd = Command::new("hzip")
        .about("Compress and expand files with Huffman coding")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path, defaults to input with .hzip extension").required(false))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path, defaults to input with the stored extension").required(false))
        .about("expand a file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = PathBuf::from(cmd.get_one::<String>("input").expect(RCH));
        let path_out = match cmd.get_one::<String>("output") {
            Some(s) => PathBuf::from(s),
            None => path_in.with_extension("hzip")
        };
        let ext = extension_of(&path_in);
        if !ok_to_overwrite(&path_out) {
            eprintln!("abort operation");
            return Ok(());
        }
        let mut in_file = std::fs::File::open(&path_in)?;
        let mut out_file = std::fs::OpenOptions::new().write(true).truncate(false).create(true).open(&path_out)?;
        let (in_size,out_size) = codec::compress(&mut in_file,&mut out_file,&ext,&hzip::STD_OPTIONS)?;
        out_file.set_len(out_size)?;
        eprintln!("compressed {} into {}",in_size,out_size);
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = PathBuf::from(cmd.get_one::<String>("input").expect(RCH));
        let mut in_file = std::fs::File::open(&path_in)?;
        match cmd.get_one::<String>("output") {
            Some(s) => {
                let path_out = PathBuf::from(s);
                if !ok_to_overwrite(&path_out) {
                    eprintln!("abort operation");
                    return Ok(());
                }
                let mut out_file = std::fs::OpenOptions::new().write(true).truncate(false).create(true).open(&path_out)?;
                let (ext,in_size,out_size) = codec::expand(&mut in_file,&mut out_file,&hzip::STD_OPTIONS)?;
                out_file.set_len(out_size)?;
                eprintln!("stored extension was {}",ext);
                eprintln!("expanded {} into {}",in_size,out_size);
            },
            None => {
                // output name depends on the stored extension, so expand into a
                // temporary file first and move it once the extension is known
                let parent = match path_in.parent() {
                    Some(p) if p.as_os_str().len() > 0 => p.to_path_buf(),
                    _ => PathBuf::from(".")
                };
                let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
                let (ext,in_size,out_size) = codec::expand(&mut in_file,temp.as_file_mut(),&hzip::STD_OPTIONS)?;
                let path_out = path_in.with_extension(&ext);
                if !ok_to_overwrite(&path_out) {
                    eprintln!("abort operation");
                    return Ok(());
                }
                temp.persist(&path_out)?;
                eprintln!("expanded {} into {}",in_size,out_size);
            }
        }
    }

    Ok(())
}
