use std::fs::{self, File};
use std::path::Path;

use xnbkit::batch::{self, Outcome};
use xnbkit::compression::Builtin;
use xnbkit::export::raw_export;
use xnbkit::formats::pak::PakReader;
use xnbkit::Result;

fn outcomes(path: &Path, arg: &str) -> Result<Vec<Outcome>> {
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("pak")) {
        let mut pak = PakReader::new(File::open(path)?)?;
        batch::decode_pak(&mut pak, &Builtin)
    } else {
        Ok(batch::decode_all(&[(arg, fs::read(path)?)], &Builtin))
    }
}

fn main() {
    for arg in std::env::args().skip(1) {
        let path = Path::new(&arg);
        let outcomes = match outcomes(path, &arg) {
            Ok(outcomes) => outcomes,
            Err(e) => {
                eprintln!("{arg}: {e}");
                continue;
            }
        };

        for Outcome { name, result } in outcomes {
            let content = match result {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("{name}: {e}");
                    continue;
                }
            };
            println!("{name}: {}", content.root_type.as_deref().unwrap_or("null"));
            let Some(export) = content.root.as_ref().and_then(raw_export) else {
                continue;
            };
            match export.write(Path::new(&name).file_name().unwrap_or_default()) {
                Ok(written) => println!("  wrote {}", written.display()),
                Err(e) => eprintln!("{name}: export failed: {e}"),
            }
        }
    }
}
