use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::wire;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub name: String,
    #[serde(default, with = "wire::day")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub phone: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub email: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub address: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub nationality: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub status: String,
    #[serde(default, with = "wire::day")]
    pub visa_expiry: Option<NaiveDate>,
    #[serde(default, deserialize_with = "wire::or_default::deserialize")]
    pub work: WorkDetails,
    #[serde(default, deserialize_with = "wire::or_default::deserialize")]
    pub passport: Passport,
    #[serde(default, deserialize_with = "wire::or_default::deserialize")]
    pub emirates_id: EmiratesId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDetails {
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub department: String,
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub designation: String,
    #[serde(default, with = "wire::amount")]
    pub salary: Decimal,
    #[serde(default, with = "wire::day")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "wire::day")]
    pub contract_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passport {
    #[serde(default, deserialize_with = "wire::text::deserialize")]
    pub passport_no: String,
    #[serde(default, with = "wire::day")]
    pub expiry_passport: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmiratesId {
    #[serde(rename = "emiratesidNo", default, deserialize_with = "wire::text::deserialize")]
    pub number: String,
    #[serde(rename = "expiryID", default, with = "wire::day")]
    pub expiry: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn null_sections_fall_back_to_empty() {
        let json = r#"{"_id": "e1", "name": "Ravi", "work": null, "passport": null, "emiratesId": null}"#;
        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.name, "Ravi");
        assert!(employee.work.department.is_empty());
        assert!(employee.passport.passport_no.is_empty());
        assert!(employee.emirates_id.expiry.is_none());
    }

    #[test]
    fn nested_sections_are_read() {
        let json = r#"{
            "name": "Ravi",
            "work": {"department": "Mechanical", "salary": "3500", "startDate": "2023-01-15"},
            "passport": {"passportNo": "P123", "expiryPassport": "2030-02-01"},
            "emiratesId": {"emiratesidNo": 784199, "expiryID": "3/1/2026"}
        }"#;
        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.work.department, "Mechanical");
        assert_eq!(employee.work.salary, dec!(3500));
        assert_eq!(employee.work.start_date, NaiveDate::from_ymd_opt(2023, 1, 15));
        assert_eq!(employee.passport.passport_no, "P123");
        assert_eq!(employee.emirates_id.number, "784199");
        assert_eq!(employee.emirates_id.expiry, NaiveDate::from_ymd_opt(2026, 3, 1));
    }
}
