//! `rolescope id` and `rolescope address` — Content addressing of the
//! canonical tree.

use std::path::Path;

use rolescope_algebra::{Create2Params, create2_address, init_code, pack};
use rolescope_config::RolescopeConfig;
use rolescope_core::Condition;

use super::normalize::canonicalize;
use super::{CommandResult, create2_params, load_condition, normalize_options};

pub fn id(config: &RolescopeConfig, file: &Path) -> CommandResult {
    let condition = load_condition(file)?;
    let canonical = canonicalize(&condition, &normalize_options(config))?;
    println!("{}", canonical.id());
    Ok(())
}

pub fn address(config: &RolescopeConfig, file: &Path) -> CommandResult {
    let condition = load_condition(file)?;
    let canonical = canonicalize(&condition, &normalize_options(config))?;
    let report = AddressReport::build(&canonical, &create2_params(config)?)?;

    println!("Condition:  {}", canonical);
    println!("  Nodes:    {}", canonical.node_count());
    println!("  Packed:   {} bytes", report.packed_len);
    println!("  Id:       {}", canonical.id());
    println!("  Deployer: {}", report.params.deployer);
    println!("  Salt:     0x{}", hex::encode(report.params.salt));
    println!("  Address:  {}", report.address);
    Ok(())
}

struct AddressReport {
    packed_len: usize,
    params: Create2Params,
    address: String,
}

impl AddressReport {
    fn build(canonical: &Condition, params: &Create2Params) -> CommandResult<Self> {
        let packed = pack(canonical)?;
        let address = create2_address(params, &init_code(&packed)?);
        Ok(Self {
            packed_len: packed.len(),
            params: *params,
            address: address.to_checksum(),
        })
    }
}
