use crate::settings::AppConfig;
use wayfarer_tools::FileOperation;

pub fn run(config: &AppConfig, path: &str, write: bool, size: Option<u64>) -> anyhow::Result<()> {
    let sandbox = config.path_sandbox()?;
    let operation = if write {
        FileOperation::Write
    } else {
        FileOperation::Read
    };

    let verdict = sandbox.validate(path, operation).and_then(|resolved| {
        if let Some(size) = size {
            sandbox.validate_size(size)?;
        }
        Ok(resolved)
    });

    match verdict {
        Ok(resolved) => {
            println!("✅ allowed ({operation}): {}", resolved.display());
            Ok(())
        }
        Err(e) => {
            println!("❌ denied ({operation}): {e}");
            std::process::exit(1);
        }
    }
}
