//! Compatibility evaluation of discovered packages.
//!
//! A package is compatible when its `target_platform_version` is exactly equal
//! to the host's version string. There is no semantic-version range matching:
//! `"2022.3"` and `"2022.3.1"` are different versions as far as this module is
//! concerned.

use std::fmt;

use crate::package::PackageDescriptor;

/// Compatibility of one package with the running host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompatibilityStatus {
    /// Built for the running host version.
    Compatible,
    /// Built for some other host version.
    Incompatible,
}

impl CompatibilityStatus {
    /// Label shown next to the package in a listing.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Compatible => "Compatible",
            Self::Incompatible => "Incompatible",
        }
    }

    /// Whether the package can be selected by the user.
    pub fn is_interactable(&self) -> bool {
        matches!(self, Self::Compatible)
    }
}

impl fmt::Display for CompatibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Partition of a descriptor sequence into compatible and incompatible indices.
///
/// Every index of the evaluated sequence appears in exactly one of the two
/// lists, and both lists keep input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilitySet {
    compatible: Vec<usize>,
    incompatible: Vec<usize>,
}

impl CompatibilitySet {
    /// Indices of compatible descriptors, in input order.
    pub fn compatible(&self) -> &[usize] {
        &self.compatible
    }

    /// Indices of incompatible descriptors, in input order.
    pub fn incompatible(&self) -> &[usize] {
        &self.incompatible
    }

    /// Number of evaluated descriptors.
    pub fn len(&self) -> usize {
        self.compatible.len() + self.incompatible.len()
    }

    /// Whether nothing was evaluated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Status of the descriptor at `index`, or `None` if out of range.
    pub fn status_of(&self, index: usize) -> Option<CompatibilityStatus> {
        if self.compatible.binary_search(&index).is_ok() {
            Some(CompatibilityStatus::Compatible)
        } else if self.incompatible.binary_search(&index).is_ok() {
            Some(CompatibilityStatus::Incompatible)
        } else {
            None
        }
    }

    /// Project the compatible indices onto the evaluated descriptors.
    pub fn compatible_in<'a>(
        &'a self,
        descriptors: &'a [PackageDescriptor],
    ) -> impl Iterator<Item = &'a PackageDescriptor> + 'a {
        self.compatible.iter().filter_map(|&i| descriptors.get(i))
    }

    /// Project the incompatible indices onto the evaluated descriptors.
    pub fn incompatible_in<'a>(
        &'a self,
        descriptors: &'a [PackageDescriptor],
    ) -> impl Iterator<Item = &'a PackageDescriptor> + 'a {
        self.incompatible.iter().filter_map(|&i| descriptors.get(i))
    }
}

/// One package as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageListing {
    /// The package.
    pub descriptor: PackageDescriptor,
    /// Its compatibility with the host.
    pub status: CompatibilityStatus,
}

impl PackageListing {
    /// Whether the listing's selection affordance is enabled.
    pub fn is_interactable(&self) -> bool {
        self.status.is_interactable()
    }
}

/// Partition descriptors by exact equality of their target version with
/// `host_version`.
///
/// # Example
///
/// ```
/// use modswap::compat::evaluate;
/// use modswap::package::PackageDescriptor;
///
/// let packages = vec![
///     PackageDescriptor::new("Dragon", "1.0", "2022.3", "dragon", "Dragon"),
///     PackageDescriptor::new("OldDragon", "1.0", "2021.1", "dragon", "OldDragon"),
/// ];
///
/// let set = evaluate(&packages, "2022.3");
/// assert_eq!(set.compatible(), &[0]);
/// assert_eq!(set.incompatible(), &[1]);
/// ```
pub fn evaluate(descriptors: &[PackageDescriptor], host_version: &str) -> CompatibilitySet {
    let mut set = CompatibilitySet::default();

    for (index, descriptor) in descriptors.iter().enumerate() {
        if descriptor.targets(host_version) {
            set.compatible.push(index);
        } else {
            set.incompatible.push(index);
        }
    }

    set
}

/// Build the full listing (compatible first, then incompatible) for display.
pub fn listings(descriptors: &[PackageDescriptor], set: &CompatibilitySet) -> Vec<PackageListing> {
    let compatible = set.compatible_in(descriptors).map(|d| PackageListing {
        descriptor: d.clone(),
        status: CompatibilityStatus::Compatible,
    });
    let incompatible = set.incompatible_in(descriptors).map(|d| PackageListing {
        descriptor: d.clone(),
        status: CompatibilityStatus::Incompatible,
    });

    compatible.chain(incompatible).collect()
}
