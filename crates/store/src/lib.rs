use std::time::Duration;

use apotheca_domain::{
    ActiveStatus, AssignmentStatus, ContractHeader, ContractSupplyTotals, PaymentStatus,
    PersonName, PrescriptionRow, SupervisorRow,
};
use sqlx::Row;
use sqlx::postgres::{PgPoolOptions, PgRow};

#[derive(Debug)]
pub enum StoreError {
    Timeout,
    Sqlx(sqlx::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Timeout => write!(f, "store operation timed out"),
            StoreError::Sqlx(err) => write!(f, "store sql error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        StoreError::Sqlx(value)
    }
}

#[derive(Debug, Clone)]
pub struct NewPractitioner {
    pub name: PersonName,
    pub email_address: String,
    pub phone_number: String,
    pub specialty_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewSpecialty {
    pub title: String,
}

#[derive(Clone)]
pub struct Store {
    pool: sqlx::PgPool,
    query_timeout: Duration,
}

impl Store {
    pub async fn connect(db_url: &str, query_timeout: Duration) -> Result<Self, StoreError> {
        let pool = tokio::time::timeout(
            Duration::from_secs(2),
            PgPoolOptions::new().max_connections(8).connect(db_url),
        )
        .await
        .map_err(|_| StoreError::Timeout)??;

        Ok(Self {
            pool,
            query_timeout,
        })
    }

    pub async fn connect_and_migrate(
        db_url: &str,
        query_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let store = Self::connect(db_url, query_timeout).await?;
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        tokio::time::timeout(Duration::from_secs(10), migrate(&self.pool))
            .await
            .map_err(|_| StoreError::Timeout)??;
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        tokio::time::timeout(
            self.query_timeout,
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await
        .map_err(|_| StoreError::Timeout)??;
        Ok(())
    }

    pub async fn prescriptions_for_pharmacy(
        &self,
        pharmacy_id: i64,
    ) -> Result<Vec<PrescriptionRow>, StoreError> {
        let rows = tokio::time::timeout(
            self.query_timeout,
            sqlx::query(
                "SELECT p.prescription_id, d.practitioner_id, \
                 d.first_name AS practitioner_first_name, d.middle_name AS practitioner_middle_name, \
                 d.last_name AS practitioner_last_name, \
                 pt.patient_id, pt.first_name AS patient_first_name, \
                 pt.middle_name AS patient_middle_name, pt.last_name AS patient_last_name, \
                 si.supply_item_id, si.tradename, \
                 p.frequency, p.quantity, p.assigned, p.date_created, p.last_updated \
                 FROM prescription AS p \
                 LEFT OUTER JOIN patient_practitioner AS pp USING (patient_practitioner_id) \
                 LEFT OUTER JOIN practitioner AS d USING (practitioner_id) \
                 LEFT OUTER JOIN patient AS pt USING (patient_id) \
                 LEFT OUTER JOIN supply_item AS si USING (supply_item_id) \
                 LEFT OUTER JOIN contract_supply AS cs USING (contract_supply_id) \
                 LEFT OUTER JOIN contract AS c USING (contract_id) \
                 WHERE c.pharmacy_id = $1 \
                 ORDER BY p.date_created",
            )
            .bind(pharmacy_id)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(|_| StoreError::Timeout)??;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(prescription_from_row(row)?);
        }
        Ok(out)
    }

    pub async fn contract_header(
        &self,
        contract_id: i64,
    ) -> Result<Option<ContractHeader>, StoreError> {
        let row = tokio::time::timeout(
            self.query_timeout,
            sqlx::query(
                "SELECT c.contract_id, c.start_date, c.end_date, \
                 c.pharmacy_id, ph.title AS pharmacy_title, \
                 c.pharmaceutical_id, pc.title AS pharmaceutical_title \
                 FROM contract AS c \
                 JOIN pharmacy AS ph USING (pharmacy_id) \
                 JOIN pharmaceutical AS pc USING (pharmaceutical_id) \
                 WHERE c.contract_id = $1",
            )
            .bind(contract_id)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(|_| StoreError::Timeout)??;

        match row {
            None => Ok(None),
            Some(row) => Ok(Some(ContractHeader {
                contract_id: row.try_get("contract_id")?,
                start_date: row.try_get("start_date")?,
                end_date: row.try_get("end_date")?,
                pharmacy_id: row.try_get("pharmacy_id")?,
                pharmacy_title: row.try_get("pharmacy_title")?,
                pharmaceutical_id: row.try_get("pharmaceutical_id")?,
                pharmaceutical_title: row.try_get("pharmaceutical_title")?,
            })),
        }
    }

    pub async fn contract_supply_totals(
        &self,
        contract_id: i64,
    ) -> Result<Vec<ContractSupplyTotals>, StoreError> {
        let rows = tokio::time::timeout(
            self.query_timeout,
            sqlx::query(
                "SELECT cs.contract_supply_id, cs.date_created, cs.last_updated, cs.payment_complete, \
                 COALESCE(SUM(si.cost_price_cents * si.quantity), 0)::BIGINT AS cost_cents, \
                 COALESCE(SUM(si.selling_price_cents * si.quantity), 0)::BIGINT AS selling_cents \
                 FROM contract_supply AS cs \
                 LEFT OUTER JOIN supply_item AS si USING (contract_supply_id) \
                 WHERE cs.contract_id = $1 \
                 GROUP BY cs.contract_supply_id, cs.date_created, cs.last_updated, cs.payment_complete \
                 ORDER BY cs.contract_supply_id",
            )
            .bind(contract_id)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(|_| StoreError::Timeout)??;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(ContractSupplyTotals {
                contract_supply_id: row.try_get("contract_supply_id")?,
                cost_cents: row.try_get("cost_cents")?,
                selling_cents: row.try_get("selling_cents")?,
                payment: PaymentStatus::from_flag(row.try_get("payment_complete")?),
                date_created: row.try_get("date_created")?,
                last_updated: row.try_get("last_updated")?,
            });
        }
        Ok(out)
    }

    pub async fn supervisors(&self) -> Result<Vec<SupervisorRow>, StoreError> {
        let rows = tokio::time::timeout(
            self.query_timeout,
            sqlx::query(
                "SELECT supervisor_id, first_name, middle_name, last_name, \
                 email_address, phone_number, active \
                 FROM supervisor \
                 ORDER BY supervisor_id",
            )
            .fetch_all(&self.pool),
        )
        .await
        .map_err(|_| StoreError::Timeout)??;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(SupervisorRow {
                supervisor_id: row.try_get("supervisor_id")?,
                name: PersonName {
                    first: row.try_get("first_name")?,
                    middle: row.try_get("middle_name")?,
                    last: row.try_get("last_name")?,
                },
                email_address: row.try_get("email_address")?,
                phone_number: row.try_get("phone_number")?,
                status: ActiveStatus::from_flag(row.try_get("active")?),
            });
        }
        Ok(out)
    }

    pub async fn insert_practitioner(
        &self,
        practitioner: &NewPractitioner,
    ) -> Result<i64, StoreError> {
        let row = tokio::time::timeout(
            self.query_timeout,
            sqlx::query(
                "INSERT INTO practitioner \
                 (first_name, middle_name, last_name, email_address, phone_number, specialty_id) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING practitioner_id",
            )
            .bind(&practitioner.name.first)
            .bind(&practitioner.name.middle)
            .bind(&practitioner.name.last)
            .bind(&practitioner.email_address)
            .bind(&practitioner.phone_number)
            .bind(practitioner.specialty_id)
            .fetch_one(&self.pool),
        )
        .await
        .map_err(|_| StoreError::Timeout)??;

        Ok(row.try_get("practitioner_id")?)
    }

    pub async fn insert_specialty(&self, specialty: &NewSpecialty) -> Result<i64, StoreError> {
        let row = tokio::time::timeout(
            self.query_timeout,
            sqlx::query("INSERT INTO specialty (title) VALUES ($1) RETURNING specialty_id")
                .bind(&specialty.title)
                .fetch_one(&self.pool),
        )
        .await
        .map_err(|_| StoreError::Timeout)??;

        Ok(row.try_get("specialty_id")?)
    }
}

fn prescription_from_row(row: &PgRow) -> Result<PrescriptionRow, StoreError> {
    Ok(PrescriptionRow {
        prescription_id: row.try_get("prescription_id")?,
        practitioner_id: row.try_get("practitioner_id")?,
        practitioner: PersonName {
            first: row.try_get("practitioner_first_name")?,
            middle: row.try_get("practitioner_middle_name")?,
            last: row.try_get("practitioner_last_name")?,
        },
        patient_id: row.try_get("patient_id")?,
        patient: PersonName {
            first: row.try_get("patient_first_name")?,
            middle: row.try_get("patient_middle_name")?,
            last: row.try_get("patient_last_name")?,
        },
        supply_item_id: row.try_get("supply_item_id")?,
        tradename: row.try_get("tradename")?,
        quantity: row.try_get("quantity")?,
        frequency: row.try_get("frequency")?,
        assignment: AssignmentStatus::from_flag(row.try_get("assigned")?),
        date_created: row.try_get("date_created")?,
        last_updated: row.try_get("last_updated")?,
    })
}

pub async fn migrate(pool: &sqlx::PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
