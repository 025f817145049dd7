use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

pub fn parse_object_id(raw: &str) -> Result<ObjectId, AppError> {
    Ok(ObjectId::parse_str(raw.trim())?)
}
