//! Compiler command line.

use crate::config::CompassOptions;

/// Arguments for one `compass compile` run, in the order the compiler
/// expects them. Empty string options are left out.
pub fn build_flags(options: &CompassOptions) -> Vec<String> {
    let mut flags = vec!["compile".to_string()];

    if !options.comments {
        flags.push("--no-line-comments".into());
    }
    if options.relative {
        flags.push("--relative-assets".into());
    }

    let valued = [
        ("-c", &options.config_file),
        ("-I", &options.import_path),
        ("--output-style", &options.mode),
        ("--css-dir", &options.css),
        ("--sass-dir", &options.sass),
        ("--images-dir", &options.img),
    ];
    for (flag, value) in valued {
        if !value.is_empty() {
            flags.push(flag.into());
            flags.push(value.clone());
        }
    }

    for lib in options.libs.iter().filter(|lib| !lib.is_empty()) {
        flags.push("-r".into());
        flags.push(lib.clone());
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionsPatch;

    fn options(patch: OptionsPatch) -> CompassOptions {
        CompassOptions::resolve(&patch.project("/srv/site"))
    }

    #[test]
    fn test_default_flags() {
        let flags = build_flags(&options(OptionsPatch::new()));
        assert_eq!(
            flags,
            [
                "compile",
                "--no-line-comments",
                "--relative-assets",
                "-I",
                "/srv/site",
                "--output-style",
                "compress",
                "--css-dir",
                "stylesheets",
                "--sass-dir",
                "stylesheets",
                "--images-dir",
                "images",
            ]
        );
    }

    #[test]
    fn test_comments_and_absolute_assets() {
        let flags = build_flags(&options(OptionsPatch {
            comments: Some(true),
            relative: Some(false),
            ..OptionsPatch::new()
        }));
        assert_eq!(flags[..3], ["compile", "-I", "/srv/site"]);
    }

    #[test]
    fn test_config_file_precedes_import_path() {
        let flags = build_flags(&options(OptionsPatch {
            config_file: Some("config/compass.rb".into()),
            ..OptionsPatch::new()
        }));
        let c = flags.iter().position(|f| f == "-c").unwrap();
        assert_eq!(flags[c + 1], "config/compass.rb");
        assert_eq!(flags[c + 2], "-I");
    }

    #[test]
    fn test_empty_libs_are_skipped() {
        let flags = build_flags(&options(OptionsPatch::new().libs(["", "susy", ""])));
        let tail = &flags[flags.len() - 3..];
        assert_eq!(tail, ["images", "-r", "susy"]);
        assert_eq!(flags.iter().filter(|f| *f == "-r").count(), 1);
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let flags = build_flags(&options(OptionsPatch {
            mode: Some(String::new()),
            img: Some(String::new()),
            ..OptionsPatch::new()
        }));
        assert!(!flags.iter().any(|f| f == "--output-style"));
        assert!(!flags.iter().any(|f| f == "--images-dir"));
        assert!(flags.iter().any(|f| f == "--css-dir"));
    }

    #[test]
    fn test_libs_last_in_order() {
        let flags = build_flags(&options(OptionsPatch::new().libs(["susy", "breakpoint"])));
        assert_eq!(flags[flags.len() - 4..], ["-r", "susy", "-r", "breakpoint"]);
    }
}
