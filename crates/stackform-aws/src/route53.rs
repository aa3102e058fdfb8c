//! Route 53 descriptors: hosted-zone lookup, alias records

use stackform_core::{Resource, ResourceId, ResourceIdentity, ResourceRef, Result, Stack, Value};

pub const ZONE_KIND: &str = "aws:route53:zone";
pub const RECORD_KIND: &str = "aws:route53:record";

/// Handle to a hosted-zone lookup.
#[derive(Debug, Clone)]
pub struct Zone {
    res: ResourceRef,
}

/// Look up the hosted zone for an apex domain.
pub fn find_zone(stack: &mut Stack, name: &str, domain: &str) -> Result<Zone> {
    let resource = Resource::lookup(ZONE_KIND, name).with_property("name", domain);
    Ok(Zone {
        res: stack.add(resource)?,
    })
}

impl Zone {
    pub fn zone_id(&self) -> Value {
        self.res.attr("zoneId")
    }
}

impl ResourceIdentity for Zone {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}

/// Alias target: the record points at another resource's DNS name rather
/// than a literal address, and the resolver checks target health.
#[derive(Debug, Clone)]
pub struct AliasTarget {
    pub name: Value,
    pub zone_id: Value,
    pub evaluate_target_health: bool,
}

/// Arguments for [`Record::new`].
#[derive(Debug, Clone)]
pub struct RecordArgs {
    pub zone_id: Value,

    /// Record name relative to the zone (the subdomain).
    pub name: String,

    pub record_type: String,
    pub aliases: Vec<AliasTarget>,
}

/// Handle to a DNS record descriptor.
#[derive(Debug, Clone)]
pub struct Record {
    res: ResourceRef,
}

impl Record {
    pub fn new(stack: &mut Stack, name: &str, args: RecordArgs) -> Result<Self> {
        let aliases = Value::list(args.aliases.into_iter().map(|alias| {
            Value::map([
                ("name", alias.name),
                ("zoneId", alias.zone_id),
                (
                    "evaluateTargetHealth",
                    alias.evaluate_target_health.into(),
                ),
            ])
        }));
        let resource = Resource::new(RECORD_KIND, name)
            .with_property("name", args.name)
            .with_property("zoneId", args.zone_id)
            .with_property("type", args.record_type)
            .with_property("aliases", aliases);
        Ok(Self {
            res: stack.add(resource)?,
        })
    }

    pub fn fqdn(&self) -> Value {
        self.res.attr("fqdn")
    }
}

impl ResourceIdentity for Record {
    fn resource_id(&self) -> &ResourceId {
        self.res.resource_id()
    }
}
