use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        }
    }

    /// Guess the format from a file name or URL.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else {
            None
        }
    }
}

/// Go's naming of an operating system and CPU architecture pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoTarget {
    pub os: &'static str,
    pub arch: &'static str,
}

impl GoTarget {
    /// The target this binary runs on, if Go publishes releases for it.
    #[must_use]
    pub fn current() -> Option<Self> {
        Self::from_rust(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust's `std::env::consts` names onto Go's `GOOS`/`GOARCH`.
    #[must_use]
    pub fn from_rust(os: &str, arch: &str) -> Option<Self> {
        let os = match os {
            "linux" => "linux",
            "macos" => "darwin",
            "windows" => "windows",
            "freebsd" => "freebsd",
            "netbsd" => "netbsd",
            "openbsd" => "openbsd",
            "illumos" => "illumos",
            "solaris" => "solaris",
            _ => return None,
        };
        let arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            "arm" => "armv6l",
            "powerpc64" => "ppc64",
            "riscv64" => "riscv64",
            "s390x" => "s390x",
            "loongarch64" => "loong64",
            _ => return None,
        };
        Some(Self { os, arch })
    }

    #[must_use]
    pub fn archive_format(self) -> ArchiveFormat {
        if self.os == "windows" {
            ArchiveFormat::Zip
        } else {
            ArchiveFormat::TarGz
        }
    }

    /// File name of the binary release archive, e.g. `go1.21.0.linux-amd64.tar.gz`.
    #[must_use]
    pub fn archive_name(self, version: &str) -> String {
        format!(
            "go{version}.{}-{}.{}",
            self.os,
            self.arch,
            self.archive_format().extension()
        )
    }
}

impl fmt::Display for GoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::{ArchiveFormat, GoTarget};

    #[test]
    fn maps_rust_names_to_go_names() {
        let mac = GoTarget::from_rust("macos", "aarch64").expect("supported");
        assert_eq!(mac.os, "darwin");
        assert_eq!(mac.arch, "arm64");

        let linux = GoTarget::from_rust("linux", "x86_64").expect("supported");
        assert_eq!(linux.to_string(), "linux-amd64");

        assert!(GoTarget::from_rust("haiku", "x86_64").is_none());
        assert!(GoTarget::from_rust("linux", "sparc").is_none());
    }

    #[test]
    fn archive_name_uses_platform_extension() {
        let linux = GoTarget::from_rust("linux", "x86_64").expect("supported");
        assert_eq!(linux.archive_name("1.21.0"), "go1.21.0.linux-amd64.tar.gz");

        let windows = GoTarget::from_rust("windows", "x86").expect("supported");
        assert_eq!(windows.archive_name("1.22rc1"), "go1.22rc1.windows-386.zip");
    }

    #[test]
    fn archive_format_from_name() {
        assert_eq!(ArchiveFormat::from_name("a/go1.2.zip"), Some(ArchiveFormat::Zip));
        assert_eq!(ArchiveFormat::from_name("master.tar.gz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::from_name("go.msi"), None);
    }
}
