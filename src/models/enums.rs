use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The serde representation is the same string stored in the database.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Role {
    Doctor => "doctor",
    Patient => "patient",
});

impl Role {
    /// The other side of a doctor/patient pair.
    pub fn counterpart(&self) -> Role {
        match self {
            Role::Doctor => Role::Patient,
            Role::Patient => Role::Doctor,
        }
    }
}

str_enum!(ConnectionStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

impl ConnectionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConnectionStatus::Pending)
    }
}

str_enum!(TestType {
    Cbc => "CBC",
    Msi => "MSI",
    Both => "Both",
});

str_enum!(FileType {
    Document => "Document",
    Image => "Image",
    Unknown => "Unknown",
});

impl FileType {
    /// Classify an uploaded file by its extension.
    pub fn from_file_name(file_name: &str) -> FileType {
        let ext = match file_name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return FileType::Unknown,
        };
        match ext.as_str() {
            "pdf" | "doc" | "docx" => FileType::Document,
            "jpg" | "jpeg" | "png" | "bmp" => FileType::Image,
            _ => FileType::Unknown,
        }
    }
}

str_enum!(UploadStatus {
    Pending => "pending",
    Analyzed => "analyzed",
    Completed => "completed",
});
