use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput, ScalarAttributeType,
};

/// Partition key attribute: the fragment's owner.
pub const PK_ATTR: &str = "ownerId";

/// Sort key attribute: the fragment id.
pub const SK_ATTR: &str = "id";

/// Attribute holding the serialized fragment record.
pub const RECORD_ATTR: &str = "record";

/// Create the fragments table programmatically.
///
/// The table uses a composite primary key with `ownerId` (String) as
/// the partition key and `id` (String) as the sort key, which gives the
/// two-level index the metadata contract requires: retrieval by
/// (owner, id) and enumeration by owner alone.
///
/// This is intended for tests and local development. In production the
/// table is typically provisioned via Infrastructure-as-Code tooling.
///
/// # Errors
///
/// Returns an error if the `CreateTable` call fails for reasons other
/// than the table already existing.
pub async fn create_table(
    client: &Client,
    table_name: &str,
) -> Result<(), aws_sdk_dynamodb::Error> {
    let result = client
        .create_table()
        .table_name(table_name)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(PK_ATTR)
                .key_type(KeyType::Hash)
                .build()
                .expect("valid key schema"),
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(SK_ATTR)
                .key_type(KeyType::Range)
                .build()
                .expect("valid key schema"),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(PK_ATTR)
                .attribute_type(ScalarAttributeType::S)
                .build()
                .expect("valid attribute definition"),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(SK_ATTR)
                .attribute_type(ScalarAttributeType::S)
                .build()
                .expect("valid attribute definition"),
        )
        .provisioned_throughput(
            ProvisionedThroughput::builder()
                .read_capacity_units(5)
                .write_capacity_units(5)
                .build()
                .expect("valid throughput"),
        )
        .send()
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(err) => {
            // Tolerate "table already exists" so create_table is idempotent.
            let service_err = err.into_service_error();
            if service_err.is_resource_in_use_exception() {
                Ok(())
            } else {
                Err(service_err.into())
            }
        }
    }
}
