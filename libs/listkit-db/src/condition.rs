//! `FilterPredicate` → `sea_orm::Condition` compiler.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use listing_core::{Error, FilterPredicate, OperatorKind, OrderBy, SortDir};
use sea_orm::{
    sea_query::{Expr, Func, Order},
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder,
};

/// Whitelisted field kind → used to coerce request text into `sea_orm::Value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    I64,
    Bool,
    DateTimeUtc,
}

impl FieldKind {
    fn expected(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::I64 => "integer",
            FieldKind::Bool => "bool",
            FieldKind::DateTimeUtc => "RFC 3339 datetime",
        }
    }
}

#[derive(Clone)]
pub struct Field<E: EntityTrait> {
    pub col: E::Column,
    pub kind: FieldKind,
}

/// API field name → column. Lookups are case-insensitive.
#[derive(Clone)]
pub struct FieldMap<E: EntityTrait> {
    map: HashMap<String, Field<E>>,
}

impl<E: EntityTrait> Default for FieldMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> FieldMap<E> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(mut self, api_name: impl Into<String>, col: E::Column, kind: FieldKind) -> Self {
        self.map
            .insert(api_name.into().to_lowercase(), Field { col, kind });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field<E>> {
        self.map.get(&name.to_lowercase())
    }

    /// Like [`FieldMap::get`], failing with `UnknownField`.
    pub fn resolve(&self, name: &str) -> Result<&Field<E>, Error> {
        self.get(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }
}

/* ---------- coercion ---------- */

pub fn coerce(field: &str, kind: FieldKind, raw: &str) -> Result<sea_orm::Value, Error> {
    let mismatch = || Error::TypeMismatch {
        field: field.to_string(),
        value: raw.to_string(),
        expected: kind.expected(),
    };
    let trimmed = raw.trim();

    Ok(match kind {
        FieldKind::String => sea_orm::Value::String(Some(Box::new(raw.to_string()))),
        FieldKind::I64 => {
            let i = trimmed.parse::<i64>().map_err(|_| mismatch())?;
            sea_orm::Value::BigInt(Some(i))
        }
        FieldKind::Bool => {
            let b = match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(mismatch()),
            };
            sea_orm::Value::Bool(Some(b))
        }
        FieldKind::DateTimeUtc => {
            let dt = DateTime::parse_from_rfc3339(trimmed)
                .map_err(|_| mismatch())?
                .with_timezone(&Utc);
            sea_orm::Value::ChronoDateTimeUtc(Some(Box::new(dt)))
        }
    })
}

fn coerce_all(field: &str, kind: FieldKind, raw: &[String]) -> Result<Vec<sea_orm::Value>, Error> {
    raw.iter().map(|v| coerce(field, kind, v)).collect()
}

/* ---------- predicate -> Condition ---------- */

pub fn predicate_to_condition<E: EntityTrait>(
    predicate: &FilterPredicate,
    fmap: &FieldMap<E>,
) -> Result<Condition, Error>
where
    E::Column: ColumnTrait + Copy,
{
    let name = predicate.field.as_str();
    let f = fmap.resolve(name)?;
    let col = f.col;

    let e = match predicate.operator {
        OperatorKind::ILike => {
            let pattern = predicate.value().unwrap_or_default();
            if f.kind != FieldKind::String {
                return Err(Error::TypeMismatch {
                    field: name.to_string(),
                    value: pattern.to_string(),
                    expected: FieldKind::String.expected(),
                });
            }
            Expr::expr(Func::lower(Expr::col(col))).like(pattern.to_lowercase())
        }
        op => {
            let vals = coerce_all(name, f.kind, &predicate.values)?;
            match (op, vals.as_slice()) {
                (OperatorKind::Eq, [v]) => Expr::col(col).eq(v.clone()),
                (OperatorKind::Ne, [v]) => Expr::col(col).ne(v.clone()),
                (OperatorKind::Gt, [v]) => Expr::col(col).gt(v.clone()),
                (OperatorKind::Ge, [v]) => Expr::col(col).gte(v.clone()),
                (OperatorKind::Lt, [v]) => Expr::col(col).lt(v.clone()),
                (OperatorKind::Le, [v]) => Expr::col(col).lte(v.clone()),
                (OperatorKind::Between, [lo, hi]) => {
                    Expr::col(col).between(lo.clone(), hi.clone())
                }
                (OperatorKind::In, []) => Expr::cust("1=0"),
                (OperatorKind::In, _) => Expr::col(col).is_in(vals.clone()),
                _ => {
                    return Err(Error::InvalidValueShape {
                        operator: op,
                        expected: op.arity(),
                        got: vals.len(),
                    })
                }
            }
        }
    };
    Ok(Condition::all().add(e))
}

/// Apply composed filters and order to a plain SeaORM `Select<E>`.
pub trait QuerySpecExt<E: EntityTrait>: Sized {
    fn apply_filters<'a>(
        self,
        filters: impl IntoIterator<Item = &'a FilterPredicate>,
        fmap: &FieldMap<E>,
    ) -> Result<Self, Error>;

    fn apply_order(self, order: &OrderBy, fmap: &FieldMap<E>) -> Result<Self, Error>;
}

impl<E> QuerySpecExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    fn apply_filters<'a>(
        self,
        filters: impl IntoIterator<Item = &'a FilterPredicate>,
        fmap: &FieldMap<E>,
    ) -> Result<Self, Error> {
        let mut cond = Condition::all();
        for predicate in filters {
            cond = cond.add(predicate_to_condition::<E>(predicate, fmap)?);
        }
        Ok(self.filter(cond))
    }

    fn apply_order(self, order: &OrderBy, fmap: &FieldMap<E>) -> Result<Self, Error> {
        let mut query = self;

        for order_key in order.iter() {
            let field = fmap.resolve(&order_key.field)?;
            let sea_order = match order_key.dir {
                SortDir::Asc => Order::Asc,
                SortDir::Desc => Order::Desc,
            };
            query = query.order_by(field.col, sea_order);
        }

        Ok(query)
    }
}
