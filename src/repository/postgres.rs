//! PostgreSQL repositories built on the connection pool and `sea-query`.

use super::{OwnerRepository, VetRepository};
use crate::error::ClinicError;
use crate::executor::{DbError, DbExecutor, FromRow};
use crate::model::{Owner, Pet, PetType, Specialty, Vet, Visit};
use crate::page::{Page, PageRequest};
use crate::pool::PgPool;
use crate::sql;
use may_postgres::{Error as PostgresError, Row};
use sea_query::{Expr, ExprTrait, Func, Order, Query, SelectStatement};
use std::collections::HashMap;

impl FromRow for PetType {
    fn from_row(row: &Row) -> Result<Self, PostgresError> {
        Ok(PetType {
            id: Some(row.try_get(0)?),
            name: row.try_get(1)?,
        })
    }
}

impl FromRow for Owner {
    fn from_row(row: &Row) -> Result<Self, PostgresError> {
        Ok(Owner {
            id: Some(row.try_get(0)?),
            first_name: row.try_get(1)?,
            last_name: row.try_get(2)?,
            address: row.try_get(3)?,
            city: row.try_get(4)?,
            telephone: row.try_get(5)?,
            pets: Vec::new(),
        })
    }
}

/// Pet row joined with its type, tagged with the owning owner id.
struct PetRow {
    owner_id: i32,
    pet: Pet,
}

impl FromRow for PetRow {
    fn from_row(row: &Row) -> Result<Self, PostgresError> {
        Ok(PetRow {
            owner_id: row.try_get(0)?,
            pet: Pet {
                id: Some(row.try_get(1)?),
                name: row.try_get(2)?,
                birth_date: row.try_get(3)?,
                pet_type: Some(PetType {
                    id: Some(row.try_get(4)?),
                    name: row.try_get(5)?,
                }),
                visits: Vec::new(),
            },
        })
    }
}

struct VisitRow {
    pet_id: i32,
    visit: Visit,
}

impl FromRow for VisitRow {
    fn from_row(row: &Row) -> Result<Self, PostgresError> {
        Ok(VisitRow {
            pet_id: row.try_get(0)?,
            visit: Visit {
                id: Some(row.try_get(1)?),
                date: row.try_get(2)?,
                description: row.try_get(3)?,
            },
        })
    }
}

impl FromRow for Vet {
    fn from_row(row: &Row) -> Result<Self, PostgresError> {
        Ok(Vet {
            id: Some(row.try_get(0)?),
            first_name: row.try_get(1)?,
            last_name: row.try_get(2)?,
            specialties: Vec::new(),
        })
    }
}

struct SpecialtyRow {
    vet_id: i32,
    specialty: Specialty,
}

impl FromRow for SpecialtyRow {
    fn from_row(row: &Row) -> Result<Self, PostgresError> {
        Ok(SpecialtyRow {
            vet_id: row.try_get(0)?,
            specialty: Specialty {
                id: Some(row.try_get(1)?),
                name: row.try_get(2)?,
            },
        })
    }
}

/// Escape `LIKE` wildcards so the prefix is matched literally.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn count<E: DbExecutor + ?Sized>(executor: &E, statement: &SelectStatement) -> Result<u64, DbError> {
    let rows = sql::fetch_rows(executor, statement)?;
    let row = rows
        .first()
        .ok_or_else(|| DbError::QueryError("COUNT returned no rows".to_string()))?;
    let total: i64 = row
        .try_get(0)
        .map_err(|e| DbError::ParseError(format!("Failed to read count: {e}")))?;
    Ok(u64::try_from(total).unwrap_or(0))
}

fn owners_query(last_name_prefix: Option<&str>) -> SelectStatement {
    let mut query = Query::select();
    query
        .columns(["id", "first_name", "last_name", "address", "city", "telephone"])
        .from("owners");
    if let Some(prefix) = last_name_prefix {
        query.and_where(Expr::col("last_name").like(like_prefix(prefix)));
    }
    query
}

fn owners_count_query(last_name_prefix: Option<&str>) -> SelectStatement {
    let mut query = Query::select();
    query.expr(Func::count(Expr::col("id"))).from("owners");
    if let Some(prefix) = last_name_prefix {
        query.and_where(Expr::col("last_name").like(like_prefix(prefix)));
    }
    query
}

/// Load pets (with types and visits) into the given owners.
fn attach_pets<E: DbExecutor + ?Sized>(executor: &E, owners: &mut [Owner]) -> Result<(), DbError> {
    let owner_ids: Vec<i32> = owners.iter().filter_map(|o| o.id).collect();
    if owner_ids.is_empty() {
        return Ok(());
    }

    let pets_query = Query::select()
        .column(("pets", "owner_id"))
        .column(("pets", "id"))
        .column(("pets", "name"))
        .column(("pets", "birth_date"))
        .column(("types", "id"))
        .column(("types", "name"))
        .from("pets")
        .inner_join("types", Expr::cust("types.id = pets.type_id"))
        .and_where(Expr::col(("pets", "owner_id")).is_in(owner_ids))
        .order_by(("pets", "name"), Order::Asc)
        .order_by(("pets", "id"), Order::Asc)
        .to_owned();
    let pet_rows: Vec<PetRow> = sql::fetch_all(executor, &pets_query)?;

    let pet_ids: Vec<i32> = pet_rows.iter().filter_map(|r| r.pet.id).collect();
    let mut visits_by_pet: HashMap<i32, Vec<Visit>> = HashMap::new();
    if !pet_ids.is_empty() {
        let visits_query = Query::select()
            .columns(["pet_id", "id", "visit_date", "description"])
            .from("visits")
            .and_where(Expr::col("pet_id").is_in(pet_ids))
            .order_by("visit_date", Order::Asc)
            .order_by("id", Order::Asc)
            .to_owned();
        let visit_rows: Vec<VisitRow> = sql::fetch_all(executor, &visits_query)?;
        for row in visit_rows {
            visits_by_pet.entry(row.pet_id).or_default().push(row.visit);
        }
    }

    let mut index: HashMap<i32, &mut Owner> = owners
        .iter_mut()
        .filter_map(|o| o.id.map(|id| (id, o)))
        .collect();
    for PetRow { owner_id, mut pet } in pet_rows {
        if let Some(visits) = pet.id.and_then(|id| visits_by_pet.remove(&id)) {
            pet.visits = visits;
        }
        if let Some(owner) = index.get_mut(&owner_id) {
            owner.push_loaded_pet(pet);
        }
    }
    Ok(())
}

fn page_of_owners<E: DbExecutor + ?Sized>(
    executor: &E,
    last_name_prefix: Option<&str>,
    page: PageRequest,
) -> Result<Page<Owner>, DbError> {
    let total = count(executor, &owners_count_query(last_name_prefix))?;
    let query = owners_query(last_name_prefix)
        .order_by("id", Order::Asc)
        .limit(u64::from(page.size()))
        .offset(page.offset())
        .to_owned();
    let mut owners: Vec<Owner> = sql::fetch_all(executor, &query)?;
    attach_pets(executor, &mut owners)?;
    Ok(Page::new(owners, page, total))
}

fn write_owner<E: DbExecutor + ?Sized>(executor: &E, owner: &mut Owner) -> Result<(), ClinicError> {
    let owner_id = match owner.id {
        None => {
            let insert = Query::insert()
                .into_table("owners")
                .columns(["first_name", "last_name", "address", "city", "telephone"])
                .values_panic([
                    owner.first_name.clone().into(),
                    owner.last_name.clone().into(),
                    owner.address.clone().into(),
                    owner.city.clone().into(),
                    owner.telephone.clone().into(),
                ])
                .returning_col("id")
                .to_owned();
            let id = sql::insert_returning_id(executor, &insert)?;
            owner.id = Some(id);
            id
        }
        Some(id) => {
            let update = Query::update()
                .table("owners")
                .values([
                    ("first_name", owner.first_name.clone().into()),
                    ("last_name", owner.last_name.clone().into()),
                    ("address", owner.address.clone().into()),
                    ("city", owner.city.clone().into()),
                    ("telephone", owner.telephone.clone().into()),
                ])
                .and_where(Expr::col("id").eq(id))
                .to_owned();
            if sql::execute(executor, &update)? == 0 {
                return Err(ClinicError::owner_not_found(id));
            }
            id
        }
    };

    for pet in owner.pets_mut() {
        write_pet(executor, owner_id, pet)?;
    }
    Ok(())
}

fn write_pet<E: DbExecutor + ?Sized>(executor: &E, owner_id: i32, pet: &mut Pet) -> Result<(), ClinicError> {
    let type_id = pet
        .pet_type
        .as_ref()
        .and_then(|t| t.id)
        .ok_or_else(|| ClinicError::BadRequest(format!("pet '{}' has no stored type", pet.name)))?;
    let birth_date = pet
        .birth_date
        .ok_or_else(|| ClinicError::BadRequest(format!("pet '{}' has no birth date", pet.name)))?;

    let pet_id = match pet.id {
        None => {
            let insert = Query::insert()
                .into_table("pets")
                .columns(["name", "birth_date", "type_id", "owner_id"])
                .values_panic([
                    pet.name.clone().into(),
                    birth_date.into(),
                    type_id.into(),
                    owner_id.into(),
                ])
                .returning_col("id")
                .to_owned();
            let id = sql::insert_returning_id(executor, &insert)?;
            pet.id = Some(id);
            id
        }
        Some(id) => {
            let update = Query::update()
                .table("pets")
                .values([
                    ("name", pet.name.clone().into()),
                    ("birth_date", birth_date.into()),
                    ("type_id", type_id.into()),
                ])
                .and_where(Expr::col("id").eq(id))
                .and_where(Expr::col("owner_id").eq(owner_id))
                .to_owned();
            if sql::execute(executor, &update)? == 0 {
                return Err(ClinicError::pet_not_found(id));
            }
            id
        }
    };

    for visit in pet.visits_mut() {
        match visit.id {
            None => {
                let insert = Query::insert()
                    .into_table("visits")
                    .columns(["pet_id", "visit_date", "description"])
                    .values_panic([
                        pet_id.into(),
                        visit.date.into(),
                        visit.description.clone().into(),
                    ])
                    .returning_col("id")
                    .to_owned();
                visit.id = Some(sql::insert_returning_id(executor, &insert)?);
            }
            Some(id) => {
                let update = Query::update()
                    .table("visits")
                    .values([
                        ("visit_date", visit.date.into()),
                        ("description", visit.description.clone().into()),
                    ])
                    .and_where(Expr::col("id").eq(id))
                    .and_where(Expr::col("pet_id").eq(pet_id))
                    .to_owned();
                sql::execute(executor, &update)?;
            }
        }
    }
    Ok(())
}

/// Owner aggregate repository on PostgreSQL.
#[derive(Clone)]
pub struct PgOwnerRepository {
    pool: PgPool,
}

impl PgOwnerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl OwnerRepository for PgOwnerRepository {
    fn find_pet_types(&self) -> Result<Vec<PetType>, ClinicError> {
        let conn = self.pool.acquire()?;
        let query = Query::select()
            .columns(["id", "name"])
            .from("types")
            .order_by("name", Order::Asc)
            .to_owned();
        Ok(sql::fetch_all(&*conn, &query)?)
    }

    fn find_by_id(&self, id: i32) -> Result<Option<Owner>, ClinicError> {
        let conn = self.pool.acquire()?;
        let query = owners_query(None)
            .and_where(Expr::col("id").eq(id))
            .to_owned();
        let mut owners: Vec<Owner> = sql::fetch_all(&*conn, &query)?;
        attach_pets(&*conn, &mut owners)?;
        Ok(owners.into_iter().next())
    }

    fn find_by_last_name(
        &self,
        last_name: &str,
        page: PageRequest,
    ) -> Result<Page<Owner>, ClinicError> {
        let conn = self.pool.acquire()?;
        Ok(page_of_owners(&*conn, Some(last_name), page)?)
    }

    fn find_all(&self, page: PageRequest) -> Result<Page<Owner>, ClinicError> {
        let conn = self.pool.acquire()?;
        Ok(page_of_owners(&*conn, None, page)?)
    }

    fn save(&self, owner: &mut Owner) -> Result<(), ClinicError> {
        let conn = self.pool.acquire()?;
        let tx = conn.begin()?;
        // Ids land in the staged copy until the commit succeeds.
        let mut staged = owner.clone();
        write_owner(&tx, &mut staged)?;
        tx.commit()?;
        log::debug!("saved owner {:?}", staged.id);
        *owner = staged;
        Ok(())
    }
}

/// Vet repository on PostgreSQL.
#[derive(Clone)]
pub struct PgVetRepository {
    pool: PgPool,
}

impl PgVetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn attach_specialties<E: DbExecutor + ?Sized>(executor: &E, vets: &mut [Vet]) -> Result<(), DbError> {
        let vet_ids: Vec<i32> = vets.iter().filter_map(|v| v.id).collect();
        if vet_ids.is_empty() {
            return Ok(());
        }
        let query = Query::select()
            .column(("vet_specialties", "vet_id"))
            .column(("specialties", "id"))
            .column(("specialties", "name"))
            .from("vet_specialties")
            .inner_join(
                "specialties",
                Expr::cust("specialties.id = vet_specialties.specialty_id"),
            )
            .and_where(Expr::col(("vet_specialties", "vet_id")).is_in(vet_ids))
            .to_owned();
        let rows: Vec<SpecialtyRow> = sql::fetch_all(executor, &query)?;
        for row in rows {
            if let Some(vet) = vets.iter_mut().find(|v| v.id == Some(row.vet_id)) {
                vet.add_specialty(row.specialty);
            }
        }
        Ok(())
    }

    fn vets_query() -> SelectStatement {
        Query::select()
            .columns(["id", "first_name", "last_name"])
            .from("vets")
            .order_by("id", Order::Asc)
            .to_owned()
    }
}

impl VetRepository for PgVetRepository {
    fn find_all(&self) -> Result<Vec<Vet>, ClinicError> {
        let conn = self.pool.acquire()?;
        let mut vets: Vec<Vet> = sql::fetch_all(&*conn, &Self::vets_query())?;
        Self::attach_specialties(&*conn, &mut vets)?;
        Ok(vets)
    }

    fn find_all_paged(&self, page: PageRequest) -> Result<Page<Vet>, ClinicError> {
        let conn = self.pool.acquire()?;
        let count_query = Query::select()
            .expr(Func::count(Expr::col("id")))
            .from("vets")
            .to_owned();
        let total = count(&*conn, &count_query)?;
        let query = Self::vets_query()
            .limit(u64::from(page.size()))
            .offset(page.offset())
            .to_owned();
        let mut vets: Vec<Vet> = sql::fetch_all(&*conn, &query)?;
        Self::attach_specialties(&*conn, &mut vets)?;
        Ok(Page::new(vets, page, total))
    }
}
