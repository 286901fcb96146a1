//! In-memory shape of `imsmanifest.xml`.
//!
//! The manifest is kept as three flat, ordered collections. Items point at
//! resources by identifier string and are looked up on demand.

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;

use super::error::{ManifestError, ResolveError, Result};

/// The parts of a package manifest needed to find its entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageManifest {
    pub default_organization_id: String,
    pub organizations: Vec<Organization>,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Organization {
    #[serde(rename = "@identifier", default)]
    pub identifier: String,
    /// Direct child items only, in document order.
    #[serde(rename = "item", default)]
    pub items: Vec<OrganizationItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrganizationItem {
    #[serde(rename = "@identifierref", default)]
    pub resource_ref: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Resource {
    #[serde(rename = "@identifier", default)]
    pub identifier: String,
    #[serde(rename = "@href", default)]
    pub href: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    organizations: RawOrganizations,
    #[serde(default)]
    resources: RawResources,
}

#[derive(Debug, Default, Deserialize)]
struct RawOrganizations {
    #[serde(rename = "@default", default)]
    default: String,
    #[serde(rename = "organization", default)]
    organizations: Vec<Organization>,
}

#[derive(Debug, Default, Deserialize)]
struct RawResources {
    #[serde(rename = "resource", default)]
    resources: Vec<Resource>,
}

impl PackageManifest {
    /// Parse manifest XML. Elements and attributes not listed here are ignored.
    pub fn parse(xml: &str) -> std::result::Result<Self, ManifestError> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        check_root(xml)?;

        let raw: RawManifest = quick_xml::de::from_str(xml)?;
        Ok(Self {
            default_organization_id: raw.organizations.default,
            organizations: raw.organizations.organizations,
            resources: raw.resources.resources,
        })
    }

    /// First organization whose identifier is the declared default.
    pub fn default_organization(&self) -> Result<&Organization> {
        self.organizations
            .iter()
            .find(|org| org.identifier == self.default_organization_id)
            .ok_or_else(|| ResolveError::NoDefaultOrganization {
                default: self.default_organization_id.clone(),
            })
    }

    /// First resource with the given identifier.
    pub fn resource(&self, identifier: &str) -> Result<&Resource> {
        self.resources
            .iter()
            .find(|res| res.identifier == identifier)
            .ok_or_else(|| ResolveError::ResourceNotFound {
                identifier: identifier.to_string(),
            })
    }

    /// Resource launched by the default organization's first item.
    ///
    /// Later items are never considered; sequencing between items is not modelled.
    pub fn launch_resource(&self) -> Result<&Resource> {
        let organization = self.default_organization()?;
        tracing::trace!(organization = %organization.identifier, "organization selected");

        let item = organization.first_item()?;
        tracing::trace!(resource_ref = %item.resource_ref, "item selected");

        self.resource(&item.resource_ref)
    }
}

impl Organization {
    pub fn first_item(&self) -> Result<&OrganizationItem> {
        self.items
            .first()
            .ok_or_else(|| ResolveError::NoOrganizationItems {
                organization: self.identifier.clone(),
            })
    }
}

/// The document element must be `manifest`, with or without a namespace prefix.
fn check_root(xml: &str) -> std::result::Result<(), ManifestError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                let name = e.local_name();
                if name.as_ref() == b"manifest" {
                    return Ok(());
                }
                return Err(ManifestError::UnexpectedRoot(
                    String::from_utf8_lossy(name.as_ref()).into_owned(),
                ));
            }
            Event::Eof => return Err(ManifestError::MissingRoot),
            _ => {}
        }
    }
}
