use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::schemas::{amount_or_zero, round_money, Property, RentRecord, Tenant};
use crate::services::due_dates::{format_due_date, next_monthly_due_date};
use crate::services::payment_status::{
    classify_payment_status, MonthRecord, PaymentStatus, StatusDisplay,
};
use crate::services::due_dates::month_name;

/// Feature flags resolved by the caller for one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingFlags {
    pub sor_billing_enabled: bool,
}

impl Default for BillingFlags {
    fn default() -> Self {
        Self {
            sor_billing_enabled: true,
        }
    }
}

/// Total monthly rent for a property.
///
/// Whole-household billing is `rent + additional_rent`. SoR billing sums each
/// tenant's rent plus `additional_rent` once per tenant, which is the behavior
/// the owner dashboards have always shown.
pub fn total_rent(property: &Property, tenants: &[Tenant], is_any_sor: bool) -> Decimal {
    let additional = amount_or_zero(property.additional_rent);
    if !is_any_sor {
        return amount_or_zero(property.rent).saturating_add(additional);
    }
    tenants
        .iter()
        .map(|tenant| amount_or_zero(tenant.rent).saturating_add(additional))
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Occupancy as a whole percent in `0..=100`.
pub fn occupancy_rate(property: &Property, tenants: &[Tenant], is_any_sor: bool) -> u32 {
    let occupied = tenants.len() as u64;
    if !is_any_sor {
        return if occupied > 0 { 100 } else { 0 };
    }
    let units = u64::from(property.units);
    if units == 0 {
        return 0;
    }
    // round half up, as the dashboards do
    let percent = (occupied * 200 + units) / (units * 2);
    percent.min(100) as u32
}

pub fn active_tenants(tenants: &[Tenant]) -> Vec<Tenant> {
    tenants
        .iter()
        .filter(|tenant| tenant.is_active)
        .cloned()
        .collect()
}

pub fn is_any_sor(tenants: &[Tenant], flags: BillingFlags) -> bool {
    flags.sor_billing_enabled && tenants.iter().any(|tenant| tenant.is_active && tenant.is_sor)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RosterViolation {
    NoPrimaryTenant,
    MultiplePrimaryTenants { tenant_ids: Vec<String> },
    DuplicateActiveEmail { email: String },
}

/// Checks one property's tenant set against the lease invariants.
pub fn validate_roster(tenants: &[Tenant]) -> Vec<RosterViolation> {
    let mut violations = Vec::new();
    let active = tenants.iter().filter(|tenant| tenant.is_active);

    let primaries = active
        .clone()
        .filter(|tenant| tenant.is_primary)
        .map(|tenant| tenant.id.clone())
        .collect::<Vec<_>>();
    match primaries.len() {
        0 if tenants.iter().any(|tenant| tenant.is_active) => {
            violations.push(RosterViolation::NoPrimaryTenant)
        }
        0 | 1 => {}
        _ => violations.push(RosterViolation::MultiplePrimaryTenants {
            tenant_ids: primaries,
        }),
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for tenant in active {
        let email = tenant.email.trim().to_ascii_lowercase();
        if email.is_empty() {
            continue;
        }
        if !seen.insert(email.clone()) && reported.insert(email.clone()) {
            violations.push(RosterViolation::DuplicateActiveEmail { email });
        }
    }

    violations
}

#[derive(Debug, Clone, Serialize)]
pub struct TenantBilling {
    pub tenant_id: String,
    pub email: String,
    pub next_due_date: Option<NaiveDate>,
    pub next_due_label: String,
    pub status: PaymentStatus,
    pub display: StatusDisplay,
}

#[derive(Debug, Clone, Serialize)]
pub struct BillingSummary {
    pub property_id: String,
    pub is_any_sor: bool,
    pub total_rent: Decimal,
    pub occupancy_rate: u32,
    pub tenants: Vec<TenantBilling>,
    pub violations: Vec<RosterViolation>,
}

/// Everything the property dashboard shows for one billing snapshot.
///
/// `records` holds the rent records already loaded for the current month;
/// pass `records_loaded = false` when that lookup could not be made.
pub fn billing_summary(
    property: &Property,
    tenants: &[Tenant],
    records: &[RentRecord],
    records_loaded: bool,
    flags: BillingFlags,
    today: NaiveDate,
) -> BillingSummary {
    let active = active_tenants(tenants);
    let sor = is_any_sor(&active, flags);
    let current_month = month_name(today);

    let tenant_rows = active
        .iter()
        .map(|tenant| {
            let record = if records_loaded {
                current_month_record(records, tenant, &property.id, current_month).into()
            } else {
                MonthRecord::NotLoaded
            };
            let status =
                classify_payment_status(tenant.start_date, tenant.grace_period, record, today);
            let next_due_date = next_monthly_due_date(tenant.start_date, today);
            TenantBilling {
                tenant_id: tenant.id.clone(),
                email: tenant.email.clone(),
                next_due_date,
                next_due_label: format_due_date(next_due_date),
                status,
                display: status.display(),
            }
        })
        .collect();

    BillingSummary {
        property_id: property.id.clone(),
        is_any_sor: sor,
        total_rent: round_money(total_rent(property, &active, sor)),
        occupancy_rate: occupancy_rate(property, &active, sor),
        tenants: tenant_rows,
        violations: validate_roster(tenants),
    }
}

/// The most advanced record for the tenant's current month, if any.
fn current_month_record<'a>(
    records: &'a [RentRecord],
    tenant: &Tenant,
    property_id: &str,
    month: &str,
) -> Option<&'a RentRecord> {
    records
        .iter()
        .filter(|record| {
            record.tenant_id == tenant.id
                && record.property_id == property_id
                && record.rent_month.trim().eq_ignore_ascii_case(month)
        })
        .max_by_key(|record| record.status.rank())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{
        billing_summary, is_any_sor, occupancy_rate, total_rent, validate_roster, BillingFlags,
        RosterViolation,
    };
    use crate::schemas::{Property, RentRecord, RentRecordStatus, Tenant};
    use crate::services::payment_status::PaymentStatus;

    fn property(units: u32) -> Property {
        Property {
            id: "p1".to_string(),
            rent: Some(dec!(1200)),
            additional_rent: Some(dec!(50)),
            units,
            ..Property::default()
        }
    }

    fn tenant(id: &str, rent: Option<Decimal>) -> Tenant {
        Tenant {
            id: id.to_string(),
            property_id: "p1".to_string(),
            email: format!("{id}@example.com"),
            rent,
            is_active: true,
            ..Tenant::default()
        }
    }

    #[test]
    fn household_rent_ignores_tenant_rent() {
        let tenants = vec![tenant("a", Some(dec!(400)))];
        assert_eq!(total_rent(&property(3), &tenants, false), dec!(1250));
        assert_eq!(total_rent(&Property::default(), &[], false), dec!(0));
    }

    #[test]
    fn sor_rent_adds_additional_rent_per_tenant() {
        let tenants = vec![
            tenant("a", Some(dec!(400))),
            tenant("b", Some(dec!(450.50))),
            tenant("c", None),
        ];
        // 400 + 450.50 + 0 + 3 * 50
        assert_eq!(total_rent(&property(3), &tenants, true), dec!(1000.50));
    }

    #[test]
    fn huge_rents_saturate() {
        let mut whale = tenant("a", Some(Decimal::MAX));
        whale.is_sor = true;
        let mut building = property(2);
        building.additional_rent = Some(dec!(1));
        assert_eq!(total_rent(&building, &[whale.clone(), whale], true), Decimal::MAX);

        building.rent = Some(Decimal::MAX);
        assert_eq!(total_rent(&building, &[], false), Decimal::MAX);
    }

    #[test]
    fn sor_occupancy_rounds_and_clamps() {
        let one = vec![tenant("a", None)];
        let two = vec![tenant("a", None), tenant("b", None)];
        assert_eq!(occupancy_rate(&property(3), &one, true), 33);
        assert_eq!(occupancy_rate(&property(3), &two, true), 67);
        assert_eq!(occupancy_rate(&property(8), &one, true), 13);
        assert_eq!(occupancy_rate(&property(0), &two, true), 0);
        assert_eq!(occupancy_rate(&property(1), &two, true), 100);
    }

    #[test]
    fn sor_requires_flag_and_active_tenant() {
        let mut sor_tenant = tenant("a", None);
        sor_tenant.is_sor = true;
        let flags = BillingFlags::default();
        assert!(is_any_sor(&[sor_tenant.clone()], flags));
        assert!(!is_any_sor(
            &[sor_tenant.clone()],
            BillingFlags {
                sor_billing_enabled: false
            }
        ));
        sor_tenant.is_active = false;
        assert!(!is_any_sor(&[sor_tenant], flags));
    }

    #[test]
    fn roster_reports_primary_and_email_violations() {
        let mut a = tenant("a", None);
        a.is_primary = true;
        let mut b = tenant("b", None);
        b.is_primary = true;
        b.email = "A@example.com ".to_string();
        let violations = validate_roster(&[a.clone(), b]);
        assert!(violations.contains(&RosterViolation::MultiplePrimaryTenants {
            tenant_ids: vec!["a".to_string(), "b".to_string()]
        }));
        assert!(violations.contains(&RosterViolation::DuplicateActiveEmail {
            email: "a@example.com".to_string()
        }));

        assert_eq!(
            validate_roster(&[tenant("c", None)]),
            vec![RosterViolation::NoPrimaryTenant]
        );
        assert!(validate_roster(&[a]).is_empty());
        assert!(validate_roster(&[]).is_empty());
    }

    #[test]
    fn summary_classifies_each_active_tenant() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
        let start = NaiveDate::from_ymd_opt(2026, 1, 12);
        let mut paid = tenant("a", Some(dec!(500)));
        paid.start_date = start;
        paid.is_primary = true;
        let mut late = tenant("b", Some(dec!(500)));
        late.start_date = start;
        let mut gone = tenant("c", Some(dec!(500)));
        gone.is_active = false;

        let records = vec![RentRecord {
            id: "r1".to_string(),
            tenant_id: "a".to_string(),
            property_id: "p1".to_string(),
            rent_month: "october".to_string(),
            status: RentRecordStatus::Manual,
            created_on: Utc::now(),
            updated_on: Utc::now(),
        }];

        let summary = billing_summary(
            &property(3),
            &[paid, late, gone],
            &records,
            true,
            BillingFlags::default(),
            today,
        );
        assert_eq!(summary.total_rent, dec!(1250));
        assert_eq!(summary.occupancy_rate, 100);
        assert_eq!(summary.tenants.len(), 2);
        assert_eq!(summary.tenants[0].status, PaymentStatus::Paid);
        assert_eq!(summary.tenants[1].status, PaymentStatus::Overdue);
        assert_eq!(summary.tenants[1].next_due_label, "Nov 12, 2026");

        let unknown = billing_summary(
            &property(3),
            &[tenant("d", None)],
            &[],
            false,
            BillingFlags::default(),
            today,
        );
        assert_eq!(unknown.tenants[0].status, PaymentStatus::Unknown);
    }

    proptest! {
        #[test]
        fn household_occupancy_is_all_or_nothing(count in 0usize..20, units in 0u32..50) {
            let tenants = (0..count).map(|i| tenant(&i.to_string(), None)).collect::<Vec<_>>();
            let rate = occupancy_rate(&property(units), &tenants, false);
            prop_assert_eq!(rate == 0, tenants.is_empty());
            prop_assert!(rate == 0 || rate == 100);
        }
    }
}
