//! Lookup commands - collections, single records, VIN and plate decoding

use anyhow::Result;
use carapi_client::Query;
use serde_json::Value;

use super::Sdk;
use crate::output::OutputContext;

/// Collection endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Years,
    Makes,
    Models,
    Submodels,
    Trims,
    Bodies,
    Engines,
    Mileages,
    InteriorColors,
    ExteriorColors,
}

impl Resource {
    fn name(&self) -> &'static str {
        match self {
            Resource::Years => "years",
            Resource::Makes => "makes",
            Resource::Models => "models",
            Resource::Submodels => "submodels",
            Resource::Trims => "trims",
            Resource::Bodies => "bodies",
            Resource::Engines => "engines",
            Resource::Mileages => "mileages",
            Resource::InteriorColors => "interior-colors",
            Resource::ExteriorColors => "exterior-colors",
        }
    }
}

/// Fetch a collection
pub async fn list(sdk: &Sdk, resource: Resource, query: Query, ctx: &OutputContext) -> Result<()> {
    let value = match (sdk, resource) {
        (Sdk::Vehicles(c), Resource::Years) => c.years(query).await?,
        (Sdk::Vehicles(c), Resource::Makes) => Value::Object(c.makes(query).await?),
        (Sdk::Vehicles(c), Resource::Models) => Value::Object(c.models(query).await?),
        (Sdk::Vehicles(c), Resource::Trims) => Value::Object(c.trims(query).await?),
        (Sdk::Vehicles(c), Resource::Bodies) => Value::Object(c.bodies(query).await?),
        (Sdk::Vehicles(c), Resource::Engines) => Value::Object(c.engines(query).await?),
        (Sdk::Vehicles(c), Resource::Mileages) => Value::Object(c.mileages(query).await?),
        (Sdk::Vehicles(c), Resource::InteriorColors) => {
            Value::Object(c.interior_colors(query).await?)
        }
        (Sdk::Vehicles(c), Resource::ExteriorColors) => {
            Value::Object(c.exterior_colors(query).await?)
        }

        (Sdk::Oem(c), Resource::Years) => c.years(query).await?,
        (Sdk::Oem(c), Resource::Makes) => Value::Object(c.makes(query).await?),
        (Sdk::Oem(c), Resource::Models) => Value::Object(c.models(query).await?),
        (Sdk::Oem(c), Resource::Submodels) => Value::Object(c.submodels(query).await?),
        (Sdk::Oem(c), Resource::Trims) => Value::Object(c.trims(query).await?),

        (Sdk::Powersports(c), Resource::Years) => c.years(query).await?,
        (Sdk::Powersports(c), Resource::Makes) => Value::Object(c.makes(query).await?),
        (Sdk::Powersports(c), Resource::Models) => Value::Object(c.models(query).await?),

        _ => return Err(sdk.unsupported(resource.name())),
    };

    ctx.print(&value);
    Ok(())
}

/// Fetch a single trim
pub async fn trim(sdk: &Sdk, id: u64, ctx: &OutputContext) -> Result<()> {
    let trim = match sdk {
        Sdk::Vehicles(c) => c.trim_item(id).await?,
        Sdk::Oem(c) => c.trim_item(id).await?,
        Sdk::Powersports(_) => return Err(sdk.unsupported("trim")),
    };
    ctx.print(&trim);
    Ok(())
}

/// Fetch a single submodel
pub async fn submodel(sdk: &Sdk, id: u64, ctx: &OutputContext) -> Result<()> {
    match sdk {
        Sdk::Oem(c) => ctx.print(&c.submodel_item(id).await?),
        _ => return Err(sdk.unsupported("submodel")),
    }
    Ok(())
}

/// Decode a VIN
pub async fn vin(sdk: &Sdk, vin: &str, query: Query, ctx: &OutputContext) -> Result<()> {
    let decoded = match sdk {
        Sdk::Vehicles(c) => c.vin(vin, query).await?,
        Sdk::Oem(c) => c.vin(vin, query).await?,
        Sdk::Powersports(_) => return Err(sdk.unsupported("vin")),
    };
    ctx.print(&decoded);
    Ok(())
}

/// Look up a license plate
pub async fn plate(
    sdk: &Sdk,
    country_code: &str,
    lookup: &str,
    region: Option<&str>,
    query: Query,
    ctx: &OutputContext,
) -> Result<()> {
    match sdk {
        Sdk::Vehicles(c) => {
            let vehicle = c.license_plate(country_code, lookup, region, query).await?;
            ctx.print(&vehicle);
        }
        _ => return Err(sdk.unsupported("plate")),
    }
    Ok(())
}

/// List OBD codes, or fetch one when a code is given
pub async fn obd(sdk: &Sdk, code: Option<&str>, query: Query, ctx: &OutputContext) -> Result<()> {
    let Sdk::Vehicles(c) = sdk else {
        return Err(sdk.unsupported("obd"));
    };
    let result = match code {
        Some(code) => c.obd_code_item(code).await?,
        None => c.obd_codes(query).await?,
    };
    ctx.print(&result);
    Ok(())
}

/// List the values of a vehicle attribute
pub async fn attributes(sdk: &Sdk, attribute: &str, ctx: &OutputContext) -> Result<()> {
    let values = match sdk {
        Sdk::Vehicles(c) => c.vehicle_attributes(attribute).await?,
        Sdk::Oem(c) => c.vehicle_attributes(attribute).await?,
        Sdk::Powersports(_) => return Err(sdk.unsupported("attributes")),
    };
    ctx.print(&values);
    Ok(())
}
