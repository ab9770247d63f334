//! License checks shared by content access handlers.

use db::{content, license, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use derive_more::{Display, Error};

/// Reasons for which a license cannot be used.
#[derive(Debug, Display, Error)]
pub(crate) enum LicenseDenial {
    #[display(fmt = "License not found")]
    LicenseNotFound,

    #[display(fmt = "Not authorized to use this license")]
    NotLicensee,

    #[display(fmt = "License is not active")]
    LicenseInactive,

    #[display(fmt = "Content not found")]
    ContentNotFound,
}

/// Find a license and its content, ensuring that the license
/// belongs to the provided wallet and is still active.
pub(crate) async fn licensed_content<C, E>(
    db: &C,
    license_id: &str,
    wallet_address: &str,
) -> Result<(license::Model, content::Model), E>
where
    C: ConnectionTrait,
    E: From<DbErr> + From<LicenseDenial>,
{
    let license = license::Entity::find()
        .filter(license::Column::LicenseId.eq(license_id))
        .one(db)
        .await?
        .ok_or(LicenseDenial::LicenseNotFound)?;

    if license.licensee_address != wallet_address {
        return Err(LicenseDenial::NotLicensee.into());
    }

    if !license.active {
        return Err(LicenseDenial::LicenseInactive.into());
    }

    let content = content::Entity::find()
        .filter(content::Column::ContentId.eq(&*license.content_id))
        .one(db)
        .await?
        .ok_or(LicenseDenial::ContentNotFound)?;

    Ok((license, content))
}
