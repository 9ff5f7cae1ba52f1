//! This module defines various unit types and their conversions.
//!
//! Plant-level quantities are annual: generation is kWh per year, fuel is mmBtu per year,
//! emissions are tonnes of CO2 per year and money is dollars per year unless stated otherwise.
use float_cmp::{ApproxEq, F64Margin};
use serde::{Deserialize, Serialize};

/// Number of kW in a MW
pub const KW_PER_MW: f64 = 1000.0;

/// Number of Btu in a mmBtu
pub const BTU_PER_MMBTU: f64 = 1e6;

/// Number of hours in a (non-leap) year
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Number of tonnes in a gigatonne
pub const TONNES_PER_GIGATONNE: f64 = 1e9;

/// Represents a dimensionless quantity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Default,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
)]
pub struct Dimensionless(pub f64);

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl std::ops::Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl Dimensionless {
    /// Raise to a floating-point power
    pub fn powf(self, rhs: f64) -> Self {
        Dimensionless(self.0.powf(rhs))
    }

    /// Whether the value is neither infinite nor NaN
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Returns the value as a f64.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

impl ApproxEq for Dimensionless {
    type Margin = F64Margin;

    fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
        self.0.approx_eq(other.0, margin)
    }
}

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
            derive_more::AddAssign,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub fn new(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the value is neither infinite nor NaN
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl std::ops::Div for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }

        impl ApproxEq for $name {
            type Margin = F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                self.0.approx_eq(other.0, margin)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::new(self.0 * lhs.0)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 / rhs.0)
            }
        }
    };
}

// Base quantities
unit_struct!(Money);
unit_struct!(Energy);
unit_struct!(Capacity);
unit_struct!(FuelEnergy);
unit_struct!(Emissions);

// Derived quantities
unit_struct!(MoneyPerEnergy);
unit_struct!(MoneyPerMWh);
unit_struct!(MoneyPerCapacity);
unit_struct!(MoneyPerKW);
unit_struct!(MoneyPerKWYear);
unit_struct!(MoneyPerFuelEnergy);
unit_struct!(MoneyPerEmissions);
unit_struct!(HeatRate);
unit_struct!(CarbonContent);

// Division rules
impl_div!(Money, Energy, MoneyPerEnergy);
impl_div!(Money, Emissions, MoneyPerEmissions);

// Multiplication rules
impl_mul!(MoneyPerEnergy, Energy, Money);
impl_mul!(MoneyPerCapacity, Capacity, Money);
impl_mul!(MoneyPerFuelEnergy, FuelEnergy, Money);
impl_mul!(CarbonContent, FuelEnergy, Emissions);

impl MoneyPerMWh {
    /// Convert to dollars per kWh
    pub fn per_kwh(self) -> MoneyPerEnergy {
        MoneyPerEnergy(self.0 / KW_PER_MW)
    }
}

impl MoneyPerKW {
    /// Convert to dollars per MW
    pub fn per_mw(self) -> MoneyPerCapacity {
        MoneyPerCapacity(self.0 * KW_PER_MW)
    }
}

impl MoneyPerKWYear {
    /// Convert to annual dollars per MW
    pub fn per_mw(self) -> MoneyPerCapacity {
        MoneyPerCapacity(self.0 * KW_PER_MW)
    }
}

impl HeatRate {
    /// The fuel needed to produce `generation` with this heat rate
    pub fn fuel_demand(self, generation: Energy) -> FuelEnergy {
        FuelEnergy(self.0 * generation.0 / BTU_PER_MMBTU)
    }
}

impl Capacity {
    /// The capacity (MW) needed to produce `generation` over a year at `capacity_factor`
    pub fn for_generation(generation: Energy, capacity_factor: Dimensionless) -> Capacity {
        Capacity(generation.0 / (capacity_factor.0 * HOURS_PER_YEAR) / KW_PER_MW)
    }

    /// The capacity factor implied by producing `generation` over a year with this capacity
    pub fn capacity_factor(self, generation: Energy) -> Dimensionless {
        Dimensionless(generation.0 / (self.0 * KW_PER_MW * HOURS_PER_YEAR))
    }
}

impl Emissions {
    /// Convert to gigatonnes
    pub fn gigatonnes(self) -> f64 {
        self.0 / TONNES_PER_GIGATONNE
    }
}
