//! Catalog repository for tax rate and discount persistence.
//!
//! Line items freeze the basis-point rate they were priced with, so editing
//! or deactivating a catalog entry never rewrites historical documents.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use faktura_core::catalog::{CatalogError, CatalogService, NewDiscount, NewTaxRate};
use faktura_shared::types::{DiscountId, OwnerId, TaxRateId};

use crate::entities::{discounts, tax_rates};

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogRepoError {
    /// Tax rate not found.
    #[error("Tax rate not found: {0}")]
    TaxRateNotFound(Uuid),

    /// Discount not found.
    #[error("Discount not found: {0}")]
    DiscountNotFound(Uuid),

    /// Discount code already exists for this owner.
    #[error("Discount code already exists: {0}")]
    DuplicateCode(String),

    /// Input rejected by validation.
    #[error(transparent)]
    Validation(#[from] CatalogError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Catalog repository for tax rates and discounts.
#[derive(Debug)]
// `DatabaseConnection` is not `Clone` when sea-orm's `mock` feature is on
// (enabled for this crate's own tests), so only derive `Clone` outside tests.
#[cfg_attr(not(test), derive(Clone))]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a tax rate.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the insert fails.
    pub async fn create_tax_rate(
        &self,
        owner_id: OwnerId,
        input: NewTaxRate,
    ) -> Result<tax_rates::Model, CatalogRepoError> {
        CatalogService::validate_tax_rate(&input)?;
        let now = Utc::now().into();
        let row = tax_rates::ActiveModel {
            id: Set(TaxRateId::new().into_inner()),
            owner_id: Set(owner_id.into_inner()),
            name: Set(input.name),
            rate_basis_points: Set(input.rate_basis_points),
            country_code: Set(input.country_code),
            is_active: Set(true),
            valid_from: Set(input.valid_from),
            valid_until: Set(input.valid_until),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(row.insert(&self.db).await?)
    }

    /// Updates a tax rate's fields.
    ///
    /// Historical line items keep the basis points they were priced with.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is missing or validation fails.
    pub async fn update_tax_rate(
        &self,
        owner_id: OwnerId,
        id: TaxRateId,
        input: NewTaxRate,
    ) -> Result<tax_rates::Model, CatalogRepoError> {
        CatalogService::validate_tax_rate(&input)?;
        let row = self.find_tax_rate(owner_id, id).await?;
        let mut active: tax_rates::ActiveModel = row.into();
        active.name = Set(input.name);
        active.rate_basis_points = Set(input.rate_basis_points);
        active.country_code = Set(input.country_code);
        active.valid_from = Set(input.valid_from);
        active.valid_until = Set(input.valid_until);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deactivates a tax rate so no new lines can reference it.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is missing or the update fails.
    pub async fn deactivate_tax_rate(
        &self,
        owner_id: OwnerId,
        id: TaxRateId,
    ) -> Result<tax_rates::Model, CatalogRepoError> {
        let row = self.find_tax_rate(owner_id, id).await?;
        let mut active: tax_rates::ActiveModel = row.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Gets a tax rate by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is missing or the query fails.
    pub async fn get_tax_rate(
        &self,
        owner_id: OwnerId,
        id: TaxRateId,
    ) -> Result<tax_rates::Model, CatalogRepoError> {
        self.find_tax_rate(owner_id, id).await
    }

    /// Lists an owner's tax rates, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_tax_rates(
        &self,
        owner_id: OwnerId,
    ) -> Result<Vec<tax_rates::Model>, CatalogRepoError> {
        Ok(tax_rates::Entity::find()
            .filter(tax_rates::Column::OwnerId.eq(owner_id.into_inner()))
            .order_by_desc(tax_rates::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Creates a discount.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the code is already taken.
    pub async fn create_discount(
        &self,
        owner_id: OwnerId,
        input: NewDiscount,
    ) -> Result<discounts::Model, CatalogRepoError> {
        CatalogService::validate_discount(&input)?;
        let existing = discounts::Entity::find()
            .filter(discounts::Column::OwnerId.eq(owner_id.into_inner()))
            .filter(discounts::Column::Code.eq(input.code.clone()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CatalogRepoError::DuplicateCode(input.code));
        }
        let now = Utc::now().into();
        let row = discounts::ActiveModel {
            id: Set(DiscountId::new().into_inner()),
            owner_id: Set(owner_id.into_inner()),
            code: Set(input.code),
            kind: Set(input.kind.into()),
            value: Set(input.value),
            is_active: Set(true),
            valid_from: Set(input.valid_from),
            valid_until: Set(input.valid_until),
            redemption_limit: Set(input.redemption_limit),
            redemption_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(row.insert(&self.db).await?)
    }

    /// Deactivates a discount so no new lines can reference it.
    ///
    /// # Errors
    ///
    /// Returns an error if the discount is missing or the update fails.
    pub async fn deactivate_discount(
        &self,
        owner_id: OwnerId,
        id: DiscountId,
    ) -> Result<discounts::Model, CatalogRepoError> {
        let row = self.find_discount(owner_id, id).await?;
        let mut active: discounts::ActiveModel = row.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Gets a discount by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the discount is missing or the query fails.
    pub async fn get_discount(
        &self,
        owner_id: OwnerId,
        id: DiscountId,
    ) -> Result<discounts::Model, CatalogRepoError> {
        self.find_discount(owner_id, id).await
    }

    /// Lists an owner's discounts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_discounts(
        &self,
        owner_id: OwnerId,
    ) -> Result<Vec<discounts::Model>, CatalogRepoError> {
        Ok(discounts::Entity::find()
            .filter(discounts::Column::OwnerId.eq(owner_id.into_inner()))
            .order_by_desc(discounts::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn find_tax_rate(
        &self,
        owner_id: OwnerId,
        id: TaxRateId,
    ) -> Result<tax_rates::Model, CatalogRepoError> {
        tax_rates::Entity::find_by_id(id.into_inner())
            .filter(tax_rates::Column::OwnerId.eq(owner_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(CatalogRepoError::TaxRateNotFound(id.into_inner()))
    }

    async fn find_discount(
        &self,
        owner_id: OwnerId,
        id: DiscountId,
    ) -> Result<discounts::Model, CatalogRepoError> {
        discounts::Entity::find_by_id(id.into_inner())
            .filter(discounts::Column::OwnerId.eq(owner_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(CatalogRepoError::DiscountNotFound(id.into_inner()))
    }
}
