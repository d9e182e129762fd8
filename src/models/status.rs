use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown {kind} status '{value}'")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}

// Status columns are plain text in storage; each enum owns its literal labels.
macro_rules! status_enum {
    ($name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownStatus {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownStatus;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

status_enum!(EmployeeStatus, "employee" {
    Active => "Active",
    Inactive => "Inactive",
});

status_enum!(AttendanceStatus, "attendance" {
    Present => "Present",
    Absent => "Absent",
    Late => "Late",
    HalfDay => "Half Day",
});

// Shared by leave requests and tool stock requests.
status_enum!(ApprovalStatus, "approval" {
    Pending => "Pending",
    Approved => "Approved",
    Rejected => "Rejected",
});

status_enum!(ToolStatus, "tool" {
    Available => "Available",
    InUse => "In Use",
    Maintenance => "Maintenance",
    OutOfStock => "Out of Stock",
});

status_enum!(MaterialStatus, "material" {
    Available => "Available",
    LowStock => "Low Stock",
    OutOfStock => "Out of Stock",
    OnOrder => "On Order",
});
