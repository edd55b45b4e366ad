use serde::Serialize;

/// A programming language the judge accepts, identified by the numeric
/// `programTypeId` the submit form expects.
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct Lang {
    pub id: u64,
    pub name: &'static str,
}

/// Language ids accepted by the submit form, as published by the judge.
pub static LANGS: &[Lang] = &[
    Lang { id: 1, name: "GNU G++ 5.1.0" },
    Lang { id: 2, name: "Microsoft Visual C++ 2010" },
    Lang { id: 3, name: "Delphi 7" },
    Lang { id: 4, name: "Free Pascal 2.6.4" },
    Lang { id: 6, name: "PHP 5.4.42" },
    Lang { id: 7, name: "Python 2.7.10" },
    Lang { id: 8, name: "Ruby 2.0.0p645" },
    Lang { id: 9, name: "C# Mono 3.12.1.0" },
    Lang { id: 10, name: "GNU GCC 5.1.0" },
    Lang { id: 12, name: "Haskell GHC 7.8.3" },
    Lang { id: 13, name: "Perl 5.20.1" },
    Lang { id: 14, name: "ActiveTcl 8.5" },
    Lang { id: 15, name: "Io-2008-01-07 (Win32)" },
    Lang { id: 17, name: "Pike 7.8" },
    Lang { id: 18, name: "Befunge" },
    Lang { id: 19, name: "OCaml 4.02.1" },
    Lang { id: 20, name: "Scala 2.11.7" },
    Lang { id: 22, name: "OpenCobol 1.0" },
    Lang { id: 25, name: "Factor" },
    Lang { id: 26, name: "Secret_171" },
    Lang { id: 27, name: "Roco" },
    Lang { id: 28, name: "D DMD32 v2.069.2" },
    Lang { id: 29, name: "MS C# .NET 4.0.30319" },
    Lang { id: 31, name: "Python 3.5.1" },
    Lang { id: 32, name: "Go 1.5.2" },
    Lang { id: 33, name: "Ada GNAT 4" },
    Lang { id: 34, name: "JavaScript V8 4.8.0" },
    Lang { id: 36, name: "Java 1.8.0_66" },
    Lang { id: 38, name: "Mysterious Language" },
    Lang { id: 39, name: "FALSE" },
    Lang { id: 40, name: "PyPy 2.7.10 (2.6.1)" },
    Lang { id: 41, name: "PyPy 3.2.5 (2.4.0)" },
    Lang { id: 42, name: "GNU G++11 5.1.0" },
    Lang { id: 43, name: "GNU GCC C11 5.1.0" },
    Lang { id: 44, name: "Picat 0.9" },
    Lang { id: 45, name: "GNU C++11 5 ZIP" },
    Lang { id: 46, name: "Java 8 ZIP" },
    Lang { id: 47, name: "J" },
    Lang { id: 48, name: "Kotlin 1.0.1" },
    Lang { id: 49, name: "Rust 1.10" },
    Lang { id: 50, name: "GNU G++14 6.2.0" },
];

/// Maps a source file extension to the default language id used when the
/// user does not pass an explicit id.
static EXTENSIONS: &[(&str, u64)] = &[
    ("c", 10),
    ("cc", 50),
    ("cpp", 1),
    ("cs", 29),
    ("go", 32),
    ("hs", 12),
    ("java", 36),
    ("js", 34),
    ("ml", 19),
    ("pas", 4),
    ("php", 6),
    ("pl", 13),
    ("py", 31),
    ("rb", 8),
    ("rs", 49),
    ("sc", 20),
    ("scala", 20),
];

pub fn find_by_id(id: u64) -> Option<Lang> {
    LANGS.iter().find(|lang| lang.id == id).copied()
}

pub fn find_by_ext(ext: &str) -> Option<Lang> {
    let ext = ext.to_lowercase();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .and_then(|(_, id)| find_by_id(*id))
}

pub fn extensions() -> impl Iterator<Item = (&'static str, Lang)> {
    EXTENSIONS
        .iter()
        .filter_map(|(ext, id)| find_by_id(*id).map(|lang| (*ext, lang)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_lang_by_id() {
        assert_eq!(find_by_id(49).unwrap().name, "Rust 1.10");
        assert!(find_by_id(9999).is_none());
    }

    #[test]
    fn finds_lang_by_ext() {
        assert_eq!(find_by_ext("cpp").unwrap().id, 1);
        assert_eq!(find_by_ext("CPP").unwrap().id, 1);
        assert!(find_by_ext("xyz").is_none());
    }

    #[test]
    fn every_extension_maps_to_known_lang() {
        for (ext, _) in EXTENSIONS {
            assert!(find_by_ext(ext).is_some(), "unmapped extension: {}", ext);
        }
    }
}
