// build.rs - generates `config::compile_time` from config/<profile>.toml
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize)]
struct Limits {
    file_processing: FileProcessingLimits,
    lexical: LexicalLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    large_file_threshold: u64,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_string_size: usize,
    max_identifier_length: usize,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

/// One generated `pub const`
struct Constant {
    name: &'static str,
    ty: &'static str,
    value: u64,
    /// Hard ceiling no profile may exceed
    ceiling: u64,
}

const fn constant(name: &'static str, ty: &'static str, value: u64, ceiling: u64) -> Constant {
    Constant {
        name,
        ty,
        value,
        ceiling,
    }
}

const GIB: u64 = 1 << 30;

fn main() {
    for var in ["SMARTSCRIPT_BUILD_PROFILE", "SMARTSCRIPT_CONFIG_DIR"] {
        println!("cargo:rerun-if-env-changed={}", var);
    }
    println!("cargo:rerun-if-changed=build.rs");

    let profile = env::var("SMARTSCRIPT_BUILD_PROFILE").unwrap_or_else(|_| "development".into());
    let path = profile_path(&profile);
    println!("cargo:rerun-if-changed={}", path.display());

    let text = fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!(
            "cannot read limit profile '{}' at {}: {}",
            profile,
            path.display(),
            e
        )
    });
    let limits: Limits = toml::from_str(&text)
        .unwrap_or_else(|e| panic!("{} is not a valid limit profile: {}", path.display(), e));

    let sections = sections(&limits);
    check(&limits, &profile, &sections);

    let out = Path::new(&env::var("OUT_DIR").expect("cargo sets OUT_DIR")).join("constants.rs");
    fs::write(&out, render(&profile, &sections))
        .unwrap_or_else(|e| panic!("cannot write {}: {}", out.display(), e));
}

/// `<workspace>/<SMARTSCRIPT_CONFIG_DIR or config>/<profile>.toml`
fn profile_path(profile: &str) -> PathBuf {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR"));
    let workspace = manifest_dir.parent().unwrap_or(&manifest_dir).to_path_buf();
    let dir = env::var("SMARTSCRIPT_CONFIG_DIR").unwrap_or_else(|_| "config".into());
    workspace.join(dir).join(format!("{}.toml", profile))
}

fn sections(limits: &Limits) -> Vec<(&'static str, Vec<Constant>)> {
    let files = &limits.file_processing;
    let lexical = &limits.lexical;
    let logging = &limits.logging;
    vec![
        (
            "file_processing",
            vec![
                constant("MAX_FILE_SIZE", "u64", files.max_file_size, GIB),
                constant("LARGE_FILE_THRESHOLD", "u64", files.large_file_threshold, GIB),
            ],
        ),
        (
            "lexical",
            vec![
                constant("MAX_STRING_SIZE", "usize", lexical.max_string_size as u64, GIB),
                constant("MAX_IDENTIFIER_LENGTH", "usize", lexical.max_identifier_length as u64, 4096),
                constant("MAX_TOKEN_COUNT", "usize", lexical.max_token_count as u64, 100_000_000),
            ],
        ),
        (
            "logging",
            vec![
                constant("LOG_BUFFER_SIZE", "usize", logging.log_buffer_size as u64, 1_000_000),
                constant("MAX_LOG_MESSAGE_LENGTH", "usize", logging.max_log_message_length as u64, 65_536),
                constant("SECURITY_MIN_LOG_LEVEL", "u8", u64::from(logging.security_min_log_level), 2),
            ],
        ),
    ]
}

fn check(limits: &Limits, profile: &str, sections: &[(&'static str, Vec<Constant>)]) {
    for (section, constants) in sections {
        for c in constants {
            if c.value > c.ceiling {
                panic!(
                    "{}: {}.{} = {} exceeds the ceiling of {}",
                    profile,
                    section,
                    c.name.to_lowercase(),
                    c.value,
                    c.ceiling
                );
            }
        }
    }

    let lexical = &limits.lexical;
    if lexical.max_string_size == 0 || lexical.max_identifier_length == 0 || lexical.max_token_count == 0 {
        panic!("{}: lexical limits must be positive", profile);
    }
    if limits.file_processing.large_file_threshold > limits.file_processing.max_file_size {
        panic!("{}: large_file_threshold is above max_file_size", profile);
    }
    if profile == "production" && limits.file_processing.max_file_size > 50_000_000 {
        panic!("production: max_file_size above 50 MB");
    }
}

fn render(profile: &str, sections: &[(&'static str, Vec<Constant>)]) -> String {
    let mut code = format!(
        "// Generated by build.rs. Do not edit.\n\npub mod compile_time {{\n    pub const PROFILE: &str = {:?};\n",
        profile
    );
    for (section, constants) in sections {
        let _ = writeln!(code, "    pub mod {} {{", section);
        for c in constants {
            let _ = writeln!(code, "        pub const {}: {} = {};", c.name, c.ty, c.value);
        }
        code.push_str("    }\n");
    }
    code.push_str("}\n");
    code
}
