use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{LeaveRecord, LeaveStore, LeaveStoreError, MemberName};

#[derive(Default)]
pub struct HashmapLeaveStore {
    records: BTreeMap<(NaiveDate, MemberName), LeaveRecord>,
}

#[async_trait::async_trait]
impl LeaveStore for HashmapLeaveStore {
    async fn add_record(
        &mut self,
        record: LeaveRecord,
    ) -> Result<(), LeaveStoreError> {
        let key = (record.date, record.requester_name.clone());

        if self.records.contains_key(&key) {
            return Err(LeaveStoreError::RecordExists);
        }

        self.records.insert(key, record);
        Ok(())
    }

    async fn get_record(
        &self,
        date: NaiveDate,
        name: &MemberName,
    ) -> Result<LeaveRecord, LeaveStoreError> {
        match self.records.get(&(date, name.clone())) {
            Some(record) => Ok(record.clone()),
            None => Err(LeaveStoreError::RecordNotFound),
        }
    }

    async fn get_records_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<LeaveRecord>, LeaveStoreError> {
        self.get_records_in_range(date, date).await
    }

    async fn get_records_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<LeaveRecord>, LeaveStoreError> {
        Ok(self
            .records
            .values()
            .filter(|record| record.date >= from && record.date <= to)
            .cloned()
            .collect())
    }

    async fn get_records_for_dates(
        &self,
        dates: &[NaiveDate],
    ) -> Result<Vec<LeaveRecord>, LeaveStoreError> {
        Ok(self
            .records
            .values()
            .filter(|record| dates.contains(&record.date))
            .cloned()
            .collect())
    }

    async fn update_record(
        &mut self,
        previous: &LeaveRecord,
        record: &LeaveRecord,
    ) -> Result<(), LeaveStoreError> {
        match self
            .records
            .get_mut(&(record.date, record.requester_name.clone()))
        {
            Some(existing) if existing != previous => {
                Err(LeaveStoreError::StaleRecord)
            }
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(LeaveStoreError::RecordNotFound),
        }
    }

    async fn delete_record(
        &mut self,
        date: NaiveDate,
        name: &MemberName,
    ) -> Result<(), LeaveStoreError> {
        match self.records.remove(&(date, name.clone())) {
            Some(_) => Ok(()),
            None => Err(LeaveStoreError::RecordNotFound),
        }
    }
}
