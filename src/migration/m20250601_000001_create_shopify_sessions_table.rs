use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShopifySessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShopifySessions::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShopifySessions::Shop).text().not_null())
                    .col(ColumnDef::new(ShopifySessions::State).text())
                    .col(
                        ColumnDef::new(ShopifySessions::IsOnline)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShopifySessions::Scope).text())
                    .col(ColumnDef::new(ShopifySessions::AccessToken).text())
                    .col(ColumnDef::new(ShopifySessions::Expires).big_integer())
                    .col(ColumnDef::new(ShopifySessions::OnlineAccessInfo).text())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShopifySessions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ShopifySessions {
    Table,
    Id,
    Shop,
    State,
    #[sea_orm(iden = "isOnline")]
    IsOnline,
    Scope,
    #[sea_orm(iden = "accessToken")]
    AccessToken,
    Expires,
    #[sea_orm(iden = "onlineAccessInfo")]
    OnlineAccessInfo,
}
