use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate a closed label enum with as_str + std::str::FromStr.
/// The serde representation is the label string itself.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

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
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Sentiment {
    Positive => "Positive",
    Neutral => "Neutral",
    Negative => "Negative",
});

str_enum!(Category {
    ProductStocking => "Product/Stocking Requests",
    AdminCoordination => "Admin/Coordination",
    FeedbackComplaints => "Feedback/Complaints",
    MaintenanceRepairs => "Maintenance/Repairs",
    BillingInvoices => "Billing/Invoices",
    GeneralFollowUps => "General Follow-ups",
    OperationalLogistics => "Operational Logistics",
});
