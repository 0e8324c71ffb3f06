//! Shared fixture: a small sales dataset with the irregularities real exports
//! carry (the `"NULL"` sentinel, quoted numbers, mixed date layouts and
//! dangling references).

#![allow(dead_code)]

use northwind_reports::{Dataset, MemoryStore, ReportParams, ReportRunner};

pub const FIXTURE: &str = r#"{
  "employees": [
    {"EmployeeID": 1, "LastName": "Davolio", "FirstName": "Nancy", "Title": "Sales Representative",
     "TitleOfCourtesy": "Ms.", "City": "Seattle", "ReportsTo": 2},
    {"EmployeeID": 2, "LastName": "Fuller", "FirstName": "Andrew", "Title": "Vice President, Sales",
     "TitleOfCourtesy": "Dr.", "City": "Tacoma", "ReportsTo": null},
    {"EmployeeID": 3, "LastName": "Leverling", "FirstName": "Janet", "Title": "Sales Representative",
     "TitleOfCourtesy": "Ms.", "City": "NULL", "ReportsTo": 2},
    {"EmployeeID": 4, "LastName": "Buchanan", "FirstName": "Steven", "Title": "Sales Manager",
     "TitleOfCourtesy": "Mr.", "ReportsTo": "2"}
  ],
  "customers": [
    {"CustomerID": "ALFKI", "CompanyName": "Alfreds Futterkiste", "ContactName": "Maria Anders",
     "Country": "Germany", "Fax": "030-0076545"},
    {"CustomerID": "ANATR", "CompanyName": "Ana Trujillo", "ContactName": "Fran Wilson",
     "Country": "Mexico", "Fax": "NULL"},
    {"CustomerID": "BERGS", "CompanyName": "Berglunds snabbkop", "ContactName": "Christina Berglund",
     "Country": "Sweden", "Fax": null},
    {"CustomerID": "BONAP", "CompanyName": "Bon app'", "ContactName": "Fran",
     "Country": "France"},
    {"CustomerID": "FRANK", "CompanyName": "Frankenversand", "ContactName": "Fred",
     "Country": "Germany", "Fax": "NULL"}
  ],
  "orders": [
    {"OrderID": 10248, "CustomerID": "ALFKI", "EmployeeID": 1, "OrderDate": "1997-01-15 00:00:00.000",
     "ShipCountry": "Germany", "ShipPostalCode": "12209"},
    {"OrderID": 10249, "CustomerID": "ANATR", "EmployeeID": 3, "OrderDate": "1997-03-02",
     "ShipCountry": "Mexico", "ShipPostalCode": "NULL"},
    {"OrderID": 10250, "CustomerID": "ALFKI", "EmployeeID": 1, "OrderDate": "1997-03-20 10:30:00",
     "ShipCountry": "Germany", "ShipPostalCode": null},
    {"OrderID": 10251, "CustomerID": "BERGS", "EmployeeID": 2, "OrderDate": "1998-01-05T00:00:00Z",
     "ShipCountry": "Sweden", "ShipPostalCode": "S-958 22"},
    {"OrderID": 10252, "CustomerID": "BERGS", "EmployeeID": 2, "OrderDate": "1998-01-05 16:00:00",
     "ShipCountry": "Sweden", "ShipPostalCode": "S-958 22"},
    {"OrderID": 10253, "CustomerID": "ZZZZZ", "EmployeeID": 1, "OrderDate": "1998-02-10",
     "ShipCountry": "Nowhere", "ShipPostalCode": "0000"},
    {"OrderID": 10254, "CustomerID": "BONAP", "EmployeeID": 9, "OrderDate": "1996-12-31",
     "ShipCountry": "France", "ShipPostalCode": "13008"}
  ],
  "order-details": [
    {"OrderID": 10248, "ProductID": 1, "UnitPrice": "5.00", "Quantity": 10, "Discount": 0.5},
    {"OrderID": 10248, "ProductID": 3, "UnitPrice": 10.00, "Quantity": 5, "Discount": 0},
    {"OrderID": 10249, "ProductID": 2, "UnitPrice": 15.00, "Quantity": 1000, "Discount": 0},
    {"OrderID": 10250, "ProductID": 1, "UnitPrice": 10.00, "Quantity": 1, "Discount": 0},
    {"OrderID": 10251, "ProductID": 5, "UnitPrice": 20.00, "Quantity": 3, "Discount": 1},
    {"OrderID": 10252, "ProductID": 3, "UnitPrice": 10.00, "Quantity": 1, "Discount": 0},
    {"OrderID": 10253, "ProductID": 1, "UnitPrice": 5.00, "Quantity": 4, "Discount": 0},
    {"OrderID": 10254, "ProductID": 2, "UnitPrice": 15.00, "Quantity": 2, "Discount": 0}
  ],
  "products": [
    {"ProductID": 1, "ProductName": "Alice Mutton", "SupplierID": 1, "CategoryID": 1,
     "QuantityPerUnit": "20 kg", "UnitPrice": 5.00, "UnitsInStock": 10, "UnitsOnOrder": 0, "Discontinued": 0},
    {"ProductID": 2, "ProductName": "Boston Crab", "SupplierID": 2, "CategoryID": 2,
     "QuantityPerUnit": "24 cans", "UnitPrice": 15.00, "UnitsInStock": 0, "UnitsOnOrder": 20, "Discontinued": 1},
    {"ProductID": 3, "ProductName": "Chai", "SupplierID": 1, "CategoryID": 1,
     "QuantityPerUnit": "10 boxes", "UnitPrice": "10.00", "UnitsInStock": 39, "UnitsOnOrder": 0, "Discontinued": false},
    {"ProductID": 4, "ProductName": "Guarana", "SupplierID": 2, "CategoryID": 1,
     "QuantityPerUnit": "12 cans", "UnitPrice": 4.50, "UnitsInStock": 5, "UnitsOnOrder": 10, "Discontinued": "1"},
    {"ProductID": 5, "ProductName": "Zaanse koeken", "SupplierID": 9, "CategoryID": 2,
     "QuantityPerUnit": "10 boxes", "UnitPrice": 20.00, "UnitsInStock": 1, "UnitsOnOrder": 0, "Discontinued": 0}
  ],
  "categories": [
    {"CategoryID": 1, "CategoryName": "Beverages"},
    {"CategoryID": 2, "CategoryName": "Condiments"},
    {"CategoryID": 3, "CategoryName": "Produce"}
  ],
  "suppliers": [
    {"SupplierID": 1, "CompanyName": "Exotic Liquids"},
    {"SupplierID": 2, "CompanyName": "New Orleans Cajun"}
  ]
}"#;

pub fn dataset() -> Dataset {
    Dataset::from_json(FIXTURE).expect("fixture parses")
}

pub fn store() -> MemoryStore {
    MemoryStore::from_dataset(&dataset())
}

pub fn runner() -> ReportRunner<MemoryStore> {
    runner_with(ReportParams::default())
}

pub fn runner_with(params: ReportParams) -> ReportRunner<MemoryStore> {
    ReportRunner::prepare(store(), params).expect("prepare runner")
}
